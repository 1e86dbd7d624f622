use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use profile::OwnerKind;
use scorer::{Criterion, MatchMethod, MatchResult};
use serde::{Deserialize, Serialize};

use crate::error::RecordFailure;

/// One ranked neighbour of a source profile.
///
/// Rule-based entries carry `score` and `breakdown`; semantic entries carry
/// only `similarity`. The two scales are never mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakdown: BTreeMap<Criterion, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    pub method: MatchMethod,
}

impl MatchEntry {
    /// Entry for `result` seen from a source of kind `source`; the target is the other side.
    pub fn from_result(result: MatchResult, source: OwnerKind) -> Self {
        let score = result.points_total();
        let target_id = match source {
            OwnerKind::Candidate => result.job_id,
            OwnerKind::Job => result.candidate_id,
        };
        Self {
            target_id,
            score,
            breakdown: result.breakdown,
            similarity: result.similarity,
            method: result.method,
        }
    }
}

/// Score descending, then similarity descending, then target id ascending.
fn rank_entries(a: &MatchEntry, b: &MatchEntry) -> Ordering {
    match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => Ordering::Equal,
    }
    .then_with(|| match (a.similarity, b.similarity) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => Ordering::Equal,
    })
    .then_with(|| a.target_id.cmp(&b.target_id))
}

/// Match results grouped by source id.
///
/// Serializes as a plain mapping of source id to its ranked entries. Sources
/// and entries are always in a deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchReport {
    groups: BTreeMap<String, Vec<MatchEntry>>,
}

impl MatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries for `source_id`, merging with any already present.
    ///
    /// The group is re-ranked and keeps one entry per target id, the best
    /// ranked one.
    pub fn insert_group(&mut self, source_id: impl Into<String>, entries: Vec<MatchEntry>) {
        let group = self.groups.entry(source_id.into()).or_default();
        group.extend(entries);
        group.sort_by(rank_entries);
        let mut seen = HashSet::with_capacity(group.len());
        group.retain(|entry| seen.insert(entry.target_id.clone()));
    }

    pub fn get(&self, source_id: &str) -> Option<&[MatchEntry]> {
        self.groups.get(source_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MatchEntry])> {
        self.groups
            .iter()
            .map(|(id, entries)| (id.as_str(), entries.as_slice()))
    }

    /// Number of source groups, including groups with no entries.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Report plus the records that could not take part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub report: MatchReport,
    pub failures: Vec<RecordFailure>,
}

impl RunOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub(crate) fn sort_failures(failures: &mut [RecordFailure]) {
    failures.sort_by(|a, b| {
        a.owner_kind
            .cmp(&b.owner_kind)
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(target: &str, score: f64) -> MatchEntry {
        MatchEntry {
            target_id: target.into(),
            score: Some(score),
            breakdown: BTreeMap::from([
                (Criterion::Remote, 0.0),
                (Criterion::Location, 0.0),
                (Criterion::Technologies, score),
            ]),
            similarity: None,
            method: MatchMethod::RuleBased,
        }
    }

    #[test]
    fn groups_are_ranked_with_id_tiebreak() {
        let mut report = MatchReport::new();
        report.insert_group("c1", vec![rule("j3", 50.0), rule("j2", 70.0), rule("j1", 50.0)]);
        let ids: Vec<_> = report.get("c1").unwrap().iter().map(|e| e.target_id.as_str()).collect();
        assert_eq!(ids, vec!["j2", "j1", "j3"]);
    }

    #[test]
    fn semantic_entries_keep_similarity_order_below_zero() {
        let mut report = MatchReport::new();
        let entries = vec![
            MatchEntry::from_result(MatchResult::semantic("c1", "a", -0.4), OwnerKind::Candidate),
            MatchEntry::from_result(MatchResult::semantic("c1", "b", -0.1), OwnerKind::Candidate),
        ];
        report.insert_group("c1", entries);
        let group = report.get("c1").unwrap();
        assert_eq!(group[0].target_id, "b");
        assert_eq!(group[0].score, None);
        assert_eq!(group[1].similarity, Some(-0.4));
    }

    #[test]
    fn merged_groups_keep_one_entry_per_target() {
        let mut report = MatchReport::new();
        report.insert_group("c1", vec![rule("j1", 50.0), rule("j2", 45.0)]);
        report.insert_group("c1", vec![rule("j1", 60.0), rule("j2", 45.0), rule("j3", 41.0)]);
        let group = report.get("c1").unwrap();
        let ids: Vec<_> = group.iter().map(|e| e.target_id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j2", "j3"]);
        assert_eq!(group[0].score, Some(60.0));
        assert_eq!(report.total_entries(), 3);
    }

    #[test]
    fn semantic_entries_serialize_without_score() {
        let mut report = MatchReport::new();
        report.insert_group(
            "j1",
            vec![MatchEntry::from_result(MatchResult::semantic("c1", "j1", 0.75), OwnerKind::Job)],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["j1"][0]["target_id"], "c1");
        assert_eq!(json["j1"][0]["similarity"], 0.75);
        assert!(json["j1"][0].get("score").is_none());
        assert!(json["j1"][0].get("breakdown").is_none());
    }

    #[test]
    fn from_result_picks_the_other_side() {
        let result = MatchResult::semantic("c1", "j1", 0.5);
        assert_eq!(MatchEntry::from_result(result.clone(), OwnerKind::Candidate).target_id, "j1");
        assert_eq!(MatchEntry::from_result(result, OwnerKind::Job).target_id, "c1");
    }

    #[test]
    fn serializes_as_source_mapping() {
        let mut report = MatchReport::new();
        report.insert_group("c2", vec![]);
        report.insert_group("c1", vec![rule("j1", 55.0)]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["c1", "c2"]);
        assert_eq!(json["c1"][0]["target_id"], "j1");
        assert_eq!(json["c1"][0]["method"], "rule_based");
        assert_eq!(json["c1"][0]["breakdown"]["technologies"], 55.0);
        assert!(json["c1"][0].get("similarity").is_none());
        assert_eq!(report.total_entries(), 1);
        assert_eq!(report.len(), 2);
    }
}
