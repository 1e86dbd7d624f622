//! # talentmatch matcher (`matcher`)
//!
//! Composes the scorer, the embedding adapter and the vector index into
//! matching runs. Two strategies are available, and their results share one
//! report shape:
//!
//! - [`run_rule_scan`] scores the full candidate × job cross product (or one
//!   source profile against the other side) with the rule-based scorer. Pairs
//!   are evaluated in parallel; a [`CancelFlag`] is polled between pairs.
//! - [`SemanticMatcher`] embeds profiles, upserts them into a [`VectorIndex`]
//!   and returns each profile's nearest neighbours of the opposite kind.
//!
//! Semantic and rule-based results are never blended into one number. A
//! caller that wants both runs both and presents them side by side.
//!
//! ## Determinism
//!
//! Reports are ordered maps keyed by source id. Entries are ranked by score,
//! then similarity, then target id, so identical inputs give identical
//! reports regardless of thread scheduling.
//!
//! ## Failures
//!
//! Invalid input and exhausted retries drop a single record into
//! [`RunOutcome::failures`]. Configuration errors (bad credentials, missing
//! collection, dimension mismatch) abort the run with a [`MatchError`].
//!
//! ```
//! use matcher::{run_rule_scan, GroupBy, RuleScan};
//! use profile::{Candidate, Job, RemotePolicy};
//! use scorer::ScoringConfig;
//!
//! let candidates = vec![Candidate::new("c1")
//!     .with_remote(RemotePolicy::RemoteOnly)
//!     .with_technologies(["rust"])];
//! let jobs = vec![Job::new("j1")
//!     .with_remote(RemotePolicy::RemoteOnly)
//!     .with_technologies(["rust", "go"])];
//!
//! let report = run_rule_scan(&candidates, &jobs, &ScoringConfig::default(), &RuleScan::new(GroupBy::Candidate)).unwrap();
//! assert_eq!(report.get("c1").unwrap()[0].score, Some(52.5));
//! ```

mod cache;
mod cancel;
mod engine;
mod error;
mod metrics;
mod report;
mod retry;
mod rules;
mod serde_millis;

pub use crate::cache::{CacheStats, EmbeddingCache, DEFAULT_CACHE_CAPACITY};
pub use crate::cancel::CancelFlag;
pub use crate::engine::{IndexOutcome, SemanticConfig, SemanticMatcher, UPSERT_BATCH_SIZE};
pub use crate::error::{MatchError, RecordFailure};
pub use crate::metrics::{MatchMetrics, RecordingMetrics, RunKind, RunRecord};
pub use crate::report::{MatchEntry, MatchReport, RunOutcome};
pub use crate::retry::{retry_async, Retried, Retryable, RetryConfig};
pub use crate::rules::{diagnose, run_rule_scan, GroupBy, RuleScan};

pub use index::VectorIndex;
