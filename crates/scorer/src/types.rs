use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named component of a rule-based score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Remote,
    Location,
    Technologies,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Remote, Criterion::Location, Criterion::Technologies];

    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Remote => "remote",
            Criterion::Location => "location",
            Criterion::Technologies => "technologies",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a [`MatchResult`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    RuleBased,
    Semantic,
}

/// One scored candidate/job pair.
///
/// Rule-based results carry a full breakdown whose values add up to `score`.
/// Semantic results are not awarded points: `score` is `0.0`, the breakdown is
/// empty, and `similarity` holds the raw index similarity to rank by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    pub job_id: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakdown: BTreeMap<Criterion, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    pub method: MatchMethod,
}

impl MatchResult {
    pub fn semantic(candidate_id: impl Into<String>, job_id: impl Into<String>, similarity: f32) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            job_id: job_id.into(),
            score: 0.0,
            breakdown: BTreeMap::new(),
            similarity: Some(similarity),
            method: MatchMethod::Semantic,
        }
    }

    /// Rule-based points, `None` for semantic results.
    pub fn points_total(&self) -> Option<f64> {
        (self.method == MatchMethod::RuleBased).then_some(self.score)
    }

    pub fn points(&self, criterion: Criterion) -> f64 {
        self.breakdown.get(&criterion).copied().unwrap_or(0.0)
    }

    pub fn breakdown_total(&self) -> f64 {
        self.breakdown.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    BelowThreshold,
}

/// A rule-based result together with the facts that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub result: MatchResult,
    pub verdict: Verdict,
    pub matched_technologies: Vec<String>,
}

impl ScoredPair {
    pub fn is_match(&self) -> bool {
        self.verdict == Verdict::Match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_results_carry_similarity_not_points() {
        let r = MatchResult::semantic("c", "j", 0.82);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.similarity, Some(0.82));
        assert!(r.breakdown.is_empty());
        assert_eq!(r.method, MatchMethod::Semantic);
        assert_eq!(r.points_total(), None);

        assert_eq!(MatchResult::semantic("c", "j", -0.3).similarity, Some(-0.3));
    }

    #[test]
    fn breakdown_serializes_with_criterion_names() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(Criterion::Remote, 25.0);
        breakdown.insert(Criterion::Technologies, 27.5);
        let r = MatchResult {
            candidate_id: "c".into(),
            job_id: "j".into(),
            score: 52.5,
            breakdown,
            similarity: None,
            method: MatchMethod::RuleBased,
        };
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["breakdown"]["remote"], 25.0);
        assert_eq!(value["method"], "rule_based");
        assert!(value.get("similarity").is_none());
    }
}
