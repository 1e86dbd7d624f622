mod common;

use talentmatch::{
    diagnose, run_rule_scan, Criterion, GroupBy, MatchError, MatchMethod, OwnerKind, RuleScan,
    ScoringConfig, ScoringWeights, Verdict,
};

#[test]
fn document_ingest_keeps_valid_records() {
    let snapshot = common::snapshot();
    assert_eq!(snapshot.candidates.len(), 2);
    assert_eq!(snapshot.jobs.len(), 3);
    assert_eq!(snapshot.rejected.len(), 1);
    assert_eq!(snapshot.rejected[0].0, OwnerKind::Candidate);
    assert_eq!(snapshot.rejected[0].1.record_index(), Some(2));
}

#[test]
fn report_grouped_by_candidate() {
    let snapshot = common::snapshot();
    let report = run_rule_scan(
        &snapshot.candidates,
        &snapshot.jobs,
        &ScoringConfig::default(),
        &RuleScan::new(GroupBy::Candidate),
    )
    .expect("scan succeeds");

    assert_eq!(report.len(), 2);

    let berlin = report.get("c-berlin").expect("c-berlin group");
    assert_eq!(berlin.len(), 1);
    assert_eq!(berlin[0].target_id, "j-berlin-onsite");
    assert_eq!(berlin[0].score, Some(72.5));
    assert_eq!(berlin[0].method, MatchMethod::RuleBased);
    assert_eq!(berlin[0].breakdown[&Criterion::Remote], 25.0);
    assert_eq!(berlin[0].breakdown[&Criterion::Location], 20.0);
    assert_eq!(berlin[0].breakdown[&Criterion::Technologies], 27.5);

    let lisbon = report.get("c-lisbon").expect("c-lisbon group");
    assert_eq!(lisbon.len(), 1);
    assert_eq!(lisbon[0].target_id, "j-remote-go");
    assert_eq!(lisbon[0].score, Some(80.0));
}

#[test]
fn report_grouped_by_job_lists_every_job() {
    let snapshot = common::snapshot();
    let report = run_rule_scan(
        &snapshot.candidates,
        &snapshot.jobs,
        &ScoringConfig::default(),
        &RuleScan::new(GroupBy::Job),
    )
    .expect("scan succeeds");

    assert_eq!(report.len(), 3);
    assert_eq!(report.get("j-berlin-onsite").unwrap()[0].target_id, "c-berlin");
    let remote = report.get("j-remote-go").unwrap();
    assert_eq!(remote.len(), 1, "c-berlin scores 25 and stays below the threshold");
    assert_eq!(remote[0].target_id, "c-lisbon");
    assert!(report.get("j-vague").unwrap().is_empty());
}

#[test]
fn report_serializes_as_map_of_ranked_entries() {
    let snapshot = common::snapshot();
    let report = run_rule_scan(
        &snapshot.candidates,
        &snapshot.jobs,
        &ScoringConfig::default(),
        &RuleScan::default(),
    )
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    let entry = &json["c-berlin"][0];
    assert_eq!(entry["target_id"], "j-berlin-onsite");
    assert_eq!(entry["score"], 72.5);
    assert_eq!(entry["method"], "rule_based");
    assert!(entry.get("similarity").is_none());
}

#[test]
fn lower_threshold_admits_more_pairs() {
    let snapshot = common::snapshot();
    let scoring = ScoringConfig::default().with_min_match_score(20.0);
    let report = run_rule_scan(
        &snapshot.candidates,
        &snapshot.jobs,
        &scoring,
        &RuleScan::new(GroupBy::Candidate).with_target("c-berlin"),
    )
    .unwrap();

    let ids: Vec<_> = report
        .get("c-berlin")
        .unwrap()
        .iter()
        .map(|e| e.target_id.as_str())
        .collect();
    assert_eq!(ids, vec!["j-berlin-onsite", "j-remote-go"]);
}

#[test]
fn diagnose_reports_every_pair_with_matched_technologies() {
    let snapshot = common::snapshot();
    let pairs = diagnose(
        &snapshot.candidates,
        &snapshot.jobs,
        &ScoringConfig::default(),
        &RuleScan::new(GroupBy::Candidate).with_target("c-berlin"),
    )
    .unwrap();

    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0].result.job_id, "j-berlin-onsite");
    assert_eq!(pairs[0].verdict, Verdict::Match);
    assert_eq!(pairs[0].matched_technologies, vec!["python", "rust"]);
    assert!(pairs[1..].iter().all(|p| p.verdict == Verdict::BelowThreshold));
}

#[test]
fn unknown_target_is_validation_error() {
    let snapshot = common::snapshot();
    let err = run_rule_scan(
        &snapshot.candidates,
        &snapshot.jobs,
        &ScoringConfig::default(),
        &RuleScan::new(GroupBy::Job).with_target("c-berlin"),
    )
    .unwrap_err();
    assert!(matches!(err, MatchError::Validation(_)));
}

#[test]
fn overweight_config_is_rejected_before_scanning() {
    let snapshot = common::snapshot();
    let scoring = ScoringConfig::default().with_weights(ScoringWeights {
        technology: 80.0,
        ..ScoringWeights::default()
    });
    let err = run_rule_scan(
        &snapshot.candidates,
        &snapshot.jobs,
        &scoring,
        &RuleScan::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MatchError::Configuration(_)));
}

#[test]
fn empty_inputs_give_empty_report() {
    let report = run_rule_scan(&[], &[], &ScoringConfig::default(), &RuleScan::default()).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.to_json_pretty().unwrap(), "{}");
}
