//! Exhaustive rule-based matching over the candidate × job cross product.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use profile::{Candidate, Job, OwnerKind};
use rayon::prelude::*;
use scorer::{evaluate, ScoredPair, ScoringConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

use crate::cancel::CancelFlag;
use crate::metrics::{MatchMetrics, RunKind};
use crate::report::{MatchEntry, MatchReport};
use crate::MatchError;

/// Which side of each pair results are grouped under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Candidate,
    Job,
}

impl GroupBy {
    pub fn source_kind(self) -> OwnerKind {
        match self {
            GroupBy::Candidate => OwnerKind::Candidate,
            GroupBy::Job => OwnerKind::Job,
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_kind().as_str())
    }
}

impl FromStr for GroupBy {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OwnerKind::from_str(s)? {
            OwnerKind::Candidate => Ok(GroupBy::Candidate),
            OwnerKind::Job => Ok(GroupBy::Job),
        }
    }
}

/// Parameters of one exhaustive scan.
#[derive(Clone, Default)]
pub struct RuleScan {
    pub group_by: GroupBy,
    /// Restrict the scan to the source profile with this id.
    pub target: Option<String>,
    pub cancel: Option<CancelFlag>,
    pub metrics: Option<Arc<dyn MatchMetrics>>,
}

impl fmt::Debug for RuleScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleScan")
            .field("group_by", &self.group_by)
            .field("target", &self.target)
            .field("cancel", &self.cancel)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl RuleScan {
    pub fn new(group_by: GroupBy) -> Self {
        Self {
            group_by,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, id: impl Into<String>) -> Self {
        self.target = Some(id.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

fn checkpoint(cancel: Option<&CancelFlag>) -> Result<(), MatchError> {
    match cancel {
        Some(flag) if flag.is_cancelled() => Err(MatchError::Cancelled),
        _ => Ok(()),
    }
}

fn select<'a, T>(
    items: &'a [T],
    target: Option<&str>,
    kind: OwnerKind,
    id_of: impl Fn(&T) -> &str,
) -> Result<Vec<&'a T>, MatchError> {
    let Some(target) = target.map(str::trim) else {
        return Ok(items.iter().collect());
    };
    let selected: Vec<&T> = items.iter().filter(|item| id_of(item) == target).collect();
    if selected.is_empty() {
        return Err(MatchError::Validation(format!("unknown {kind} `{target}`")));
    }
    Ok(selected)
}

/// Every pair for the selected sources, grouped by source id in input order.
fn scan_groups(
    candidates: &[Candidate],
    jobs: &[Job],
    config: &ScoringConfig,
    scan: &RuleScan,
) -> Result<Vec<(String, Vec<ScoredPair>)>, MatchError> {
    let cancel = scan.cancel.as_ref();
    let target = scan.target.as_deref();

    match scan.group_by {
        GroupBy::Candidate => select(candidates, target, OwnerKind::Candidate, |c| c.id.as_str())?
            .into_par_iter()
            .map(|candidate| {
                let pairs = jobs
                    .iter()
                    .map(|job| {
                        checkpoint(cancel)?;
                        Ok(evaluate(candidate, job, config))
                    })
                    .collect::<Result<Vec<_>, MatchError>>()?;
                Ok((candidate.id.clone(), pairs))
            })
            .collect(),
        GroupBy::Job => select(jobs, target, OwnerKind::Job, |j| j.id.as_str())?
            .into_par_iter()
            .map(|job| {
                let pairs = candidates
                    .iter()
                    .map(|candidate| {
                        checkpoint(cancel)?;
                        Ok(evaluate(candidate, job, config))
                    })
                    .collect::<Result<Vec<_>, MatchError>>()?;
                Ok((job.id.clone(), pairs))
            })
            .collect(),
    }
}

/// Score every candidate/job pair and keep those at or above the threshold.
///
/// Every selected source appears in the report, with an empty list when
/// nothing matched. Within a group entries are ranked by score, ties broken by
/// target id, so two runs over the same input produce identical reports.
pub fn run_rule_scan(
    candidates: &[Candidate],
    jobs: &[Job],
    config: &ScoringConfig,
    scan: &RuleScan,
) -> Result<MatchReport, MatchError> {
    config.validate()?;
    let span = tracing::span!(
        Level::INFO,
        "matcher.rule_scan",
        group_by = %scan.group_by,
        candidates = candidates.len(),
        jobs = jobs.len()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let source = scan.group_by.source_kind();
    let groups = scan_groups(candidates, jobs, config, scan)?;
    let evaluated: usize = groups.iter().map(|(_, pairs)| pairs.len()).sum();

    let mut report = MatchReport::new();
    for (source_id, pairs) in groups {
        let entries: Vec<MatchEntry> = pairs
            .into_iter()
            .filter(ScoredPair::is_match)
            .map(|pair| MatchEntry::from_result(pair.result, source))
            .collect();
        debug!(source = %source_id, matches = entries.len(), "group_scored");
        report.insert_group(source_id, entries);
    }

    let elapsed = start.elapsed();
    info!(
        evaluated,
        groups = report.len(),
        matches = report.total_entries(),
        elapsed_micros = elapsed.as_micros() as u64,
        "rule_scan_complete"
    );
    if let Some(metrics) = &scan.metrics {
        metrics.record_run(RunKind::RuleScan, elapsed, report.total_entries(), 0);
    }
    Ok(report)
}

/// Every evaluated pair, below-threshold ones included.
///
/// Ordered by source id, then score descending, then target id.
pub fn diagnose(
    candidates: &[Candidate],
    jobs: &[Job],
    config: &ScoringConfig,
    scan: &RuleScan,
) -> Result<Vec<ScoredPair>, MatchError> {
    config.validate()?;
    let group_by = scan.group_by;
    let ids = move |pair: &ScoredPair| match group_by {
        GroupBy::Candidate => (pair.result.candidate_id.clone(), pair.result.job_id.clone()),
        GroupBy::Job => (pair.result.job_id.clone(), pair.result.candidate_id.clone()),
    };

    let mut pairs: Vec<ScoredPair> = scan_groups(candidates, jobs, config, scan)?
        .into_iter()
        .flat_map(|(_, pairs)| pairs)
        .collect();
    pairs.sort_by(|a, b| {
        let (a_source, a_target) = ids(a);
        let (b_source, b_target) = ids(b);
        a_source
            .cmp(&b_source)
            .then_with(|| b.result.score.total_cmp(&a.result.score))
            .then_with(|| a_target.cmp(&b_target))
    });
    Ok(pairs)
}
