//! Metrics hooks for matching runs.
//!
//! A [`MatchMetrics`] implementation is handed to each matcher or scan that
//! should report; there is no process-wide recorder.
//!
//! ```
//! use std::time::Duration;
//! use matcher::{MatchMetrics, RecordingMetrics, RunKind};
//!
//! let metrics = RecordingMetrics::new();
//! metrics.record_run(RunKind::RuleScan, Duration::from_millis(3), 12, 0);
//! let runs = metrics.runs();
//! assert_eq!(runs.len(), 1);
//! assert_eq!(runs[0].kind, RunKind::RuleScan);
//! assert_eq!(runs[0].result_count, 12);
//! ```

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Which kind of run a metrics record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    RuleScan,
    Index,
    SemanticMatch,
    TextSearch,
}

/// Metrics observer for matching runs.
pub trait MatchMetrics: Send + Sync {
    /// `result_count` counts report entries (or index points for
    /// [`RunKind::Index`]); `failure_count` counts records that dropped out.
    fn record_run(&self, kind: RunKind, latency: Duration, result_count: usize, failure_count: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub kind: RunKind,
    pub latency: Duration,
    pub result_count: usize,
    pub failure_count: usize,
}

/// Keeps every record in memory. Meant for tests and the CLI summary.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    runs: Mutex<Vec<RunRecord>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<RunRecord> {
        self.runs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl MatchMetrics for RecordingMetrics {
    fn record_run(&self, kind: RunKind, latency: Duration, result_count: usize, failure_count: usize) {
        self.runs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RunRecord {
                kind,
                latency,
                result_count,
                failure_count,
            });
    }
}
