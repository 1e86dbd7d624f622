use std::collections::BTreeMap;

use profile::{normalize_key, Candidate, Job, RemotePolicy};
use tracing::trace;

use crate::config::{ScoringConfig, ScoringWeights, MAX_SCORE};
use crate::types::{Criterion, MatchMethod, MatchResult, ScoredPair, Verdict};

fn same_location(candidate: &Candidate, job: &Job) -> Option<bool> {
    let c = candidate.location.as_deref().map(normalize_key)?;
    let j = job.location.as_deref().map(normalize_key)?;
    if c.is_empty() || j.is_empty() {
        return None;
    }
    Some(c == j)
}

fn remote_points(candidate: &Candidate, job: &Job, weights: &ScoringWeights) -> f64 {
    let compatible = match job.remote {
        RemotePolicy::RemoteOnly => candidate.remote.allows_remote(),
        RemotePolicy::Onsite | RemotePolicy::Hybrid => {
            candidate.remote.is_on_premises()
                && (same_location(candidate, job) == Some(true) || candidate.willing_to_relocate)
        }
        RemotePolicy::Unspecified => false,
    };
    if compatible {
        weights.remote
    } else {
        0.0
    }
}

fn location_points(candidate: &Candidate, job: &Job, weights: &ScoringWeights) -> f64 {
    match same_location(candidate, job) {
        Some(true) => weights.location_exact,
        Some(false) if candidate.willing_to_relocate && job.remote == RemotePolicy::Onsite => {
            weights.relocation
        }
        _ => 0.0,
    }
}

fn technology_points(candidate: &Candidate, job: &Job, weights: &ScoringWeights) -> f64 {
    let required = job.technologies.len();
    if required == 0 {
        return 0.0;
    }
    let overlap = candidate.technologies.overlap_count(&job.technologies);
    (weights.technology * overlap as f64 / required as f64).min(weights.technology)
}

/// Score one candidate/job pair.
///
/// Pure and deterministic. Missing optional fields contribute zero points
/// rather than failing. The breakdown always lists every [`Criterion`].
pub fn score(candidate: &Candidate, job: &Job, config: &ScoringConfig) -> MatchResult {
    let weights = &config.weights;
    let mut breakdown = BTreeMap::new();
    breakdown.insert(Criterion::Remote, remote_points(candidate, job, weights));
    breakdown.insert(Criterion::Location, location_points(candidate, job, weights));
    breakdown.insert(Criterion::Technologies, technology_points(candidate, job, weights));

    let total: f64 = breakdown.values().sum();
    let score = total.min(MAX_SCORE);

    trace!(
        candidate_id = %candidate.id,
        job_id = %job.id,
        score,
        "pair_scored"
    );

    MatchResult {
        candidate_id: candidate.id.clone(),
        job_id: job.id.clone(),
        score,
        breakdown,
        similarity: None,
        method: MatchMethod::RuleBased,
    }
}

/// Score a pair and classify it against the configured threshold.
pub fn evaluate(candidate: &Candidate, job: &Job, config: &ScoringConfig) -> ScoredPair {
    let result = score(candidate, job, config);
    let verdict = if result.score >= config.min_match_score {
        Verdict::Match
    } else {
        Verdict::BelowThreshold
    };
    let matched_technologies = candidate
        .technologies
        .intersection(&job.technologies)
        .map(str::to_string)
        .collect();
    ScoredPair {
        result,
        verdict,
        matched_technologies,
    }
}

/// Whether a pair clears the configured threshold.
pub fn is_match(candidate: &Candidate, job: &Job, config: &ScoringConfig) -> bool {
    score(candidate, job, config).score >= config.min_match_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin_candidate() -> Candidate {
        Candidate::new("c-berlin")
            .with_location("Berlin")
            .with_remote(RemotePolicy::RemoteOnly)
            .with_relocation(false)
            .with_technologies(["python", "go"])
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn onsite_job_in_same_city() {
        let job = Job::new("j-berlin")
            .with_location("Berlin")
            .with_remote(RemotePolicy::Onsite)
            .with_technologies(["python", "rust"]);
        let pair = evaluate(&berlin_candidate(), &job, &ScoringConfig::default());

        assert_close(pair.result.points(Criterion::Remote), 0.0);
        assert_close(pair.result.points(Criterion::Location), 20.0);
        assert_close(pair.result.points(Criterion::Technologies), 27.5);
        assert_close(pair.result.score, 47.5);
        assert_eq!(pair.verdict, Verdict::Match);
        assert_eq!(pair.matched_technologies, vec!["python"]);
    }

    #[test]
    fn remote_job_elsewhere() {
        let job = Job::new("j-remote")
            .with_location("Remote")
            .with_remote(RemotePolicy::RemoteOnly)
            .with_technologies(["go", "java"]);
        let result = score(&berlin_candidate(), &job, &ScoringConfig::default());

        assert_close(result.points(Criterion::Remote), 25.0);
        assert_close(result.points(Criterion::Location), 0.0);
        assert_close(result.points(Criterion::Technologies), 27.5);
        assert_close(result.score, 52.5);
        assert!(is_match(&berlin_candidate(), &job, &ScoringConfig::default()));
    }

    #[test]
    fn empty_job_technologies_give_zero_overlap() {
        let job = Job::new("j-empty").with_remote(RemotePolicy::RemoteOnly);
        let result = score(&berlin_candidate(), &job, &ScoringConfig::default());
        assert_close(result.points(Criterion::Technologies), 0.0);
        assert!(result.score.is_finite());
    }

    #[test]
    fn empty_candidate_technologies_give_zero_overlap() {
        let candidate = Candidate::new("c-none").with_remote(RemotePolicy::RemoteOnly);
        let job = Job::new("j").with_technologies(["rust"]);
        assert_close(
            score(&candidate, &job, &ScoringConfig::default()).points(Criterion::Technologies),
            0.0,
        );
    }

    #[test]
    fn overlap_ignores_case_and_whitespace() {
        let candidate = Candidate::new("c").with_technologies(["Python"]);
        let job = Job::new("j").with_technologies(["python "]);
        assert_close(
            score(&candidate, &job, &ScoringConfig::default()).points(Criterion::Technologies),
            55.0,
        );
    }

    #[test]
    fn relocation_earns_partial_location_credit() {
        let candidate = Candidate::new("c")
            .with_location("Lisbon")
            .with_remote(RemotePolicy::Onsite)
            .with_relocation(true);
        let job = Job::new("j")
            .with_location("Paris")
            .with_remote(RemotePolicy::Onsite);
        let result = score(&candidate, &job, &ScoringConfig::default());
        assert_close(result.points(Criterion::Location), 10.0);
        assert_close(result.points(Criterion::Remote), 25.0);
    }

    #[test]
    fn location_compare_is_normalized() {
        let candidate = Candidate::new("c").with_location("  new   YORK ");
        let job = Job::new("j").with_location("New York");
        assert_close(
            score(&candidate, &job, &ScoringConfig::default()).points(Criterion::Location),
            20.0,
        );
    }

    #[test]
    fn missing_location_yields_zero_location_points() {
        let candidate = Candidate::new("c").with_relocation(true);
        let job = Job::new("j")
            .with_location("Paris")
            .with_remote(RemotePolicy::Onsite);
        let result = score(&candidate, &job, &ScoringConfig::default());
        assert_close(result.points(Criterion::Location), 0.0);
    }

    #[test]
    fn onsite_job_rejects_remote_only_candidate_without_relocation() {
        let candidate = Candidate::new("c")
            .with_location("Oslo")
            .with_remote(RemotePolicy::RemoteOnly);
        let job = Job::new("j")
            .with_location("Paris")
            .with_remote(RemotePolicy::Onsite);
        assert_close(
            score(&candidate, &job, &ScoringConfig::default()).points(Criterion::Remote),
            0.0,
        );
    }

    #[test]
    fn score_equals_breakdown_sum_and_stays_bounded() {
        let remotes = [
            RemotePolicy::RemoteOnly,
            RemotePolicy::Hybrid,
            RemotePolicy::Onsite,
            RemotePolicy::Unspecified,
        ];
        let config = ScoringConfig::default();
        for c_remote in remotes {
            for j_remote in remotes {
                for relocate in [false, true] {
                    let candidate = Candidate::new("c")
                        .with_location("Berlin")
                        .with_remote(c_remote)
                        .with_relocation(relocate)
                        .with_technologies(["rust", "go", "sql"]);
                    let job = Job::new("j")
                        .with_location("berlin")
                        .with_remote(j_remote)
                        .with_technologies(["rust", "go"]);
                    let result = score(&candidate, &job, &config);
                    assert!((0.0..=MAX_SCORE).contains(&result.score));
                    assert_close(result.score, result.breakdown_total());
                    assert_eq!(result.breakdown.len(), Criterion::ALL.len());
                }
            }
        }
    }

    #[test]
    fn custom_threshold_changes_verdict() {
        let job = Job::new("j")
            .with_location("Berlin")
            .with_remote(RemotePolicy::Onsite)
            .with_technologies(["python", "rust"]);
        let strict = ScoringConfig::default().with_min_match_score(50.0);
        let pair = evaluate(&berlin_candidate(), &job, &strict);
        assert_eq!(pair.verdict, Verdict::BelowThreshold);
        assert!(!pair.is_match());
    }
}
