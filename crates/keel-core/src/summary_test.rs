use super::*;
use tempfile::tempdir;

#[test]
fn test_counts_for_clean_apply() {
    let mut summary = RunSummary::new(RunMode::Apply, false, 2);
    summary.record("001_init.sql", Action::Apply, Some(12), false);
    summary.record("002_add_col.sql", Action::Skip, None, false);

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.not_attempted, 0);
    assert_eq!(summary.outcome, RunOutcome::Success);
}

#[test]
fn test_blocked_marks_divergent_outcome() {
    let mut summary = RunSummary::new(RunMode::Apply, false, 2);
    summary.record("001_init.sql", Action::Blocked, None, false);
    summary.record("002_add_col.sql", Action::Skip, None, false);

    assert_eq!(summary.divergent, 1);
    assert_eq!(summary.applied, 0);
    assert_eq!(summary.outcome, RunOutcome::Divergent);
}

#[test]
fn test_forced_counts_as_applied_and_divergent() {
    let mut summary = RunSummary::new(RunMode::Apply, true, 1);
    summary.record("001_init.sql", Action::Forced, Some(3), false);

    assert!(summary.force);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.divergent, 1);
    assert_eq!(summary.outcome, RunOutcome::Success);
}

#[test]
fn test_failure_wins_and_leaves_rest_unattempted() {
    let mut summary = RunSummary::new(RunMode::Apply, false, 3);
    summary.record("a.sql", Action::Blocked, None, false);
    summary.record("b.sql", Action::Apply, Some(8), true);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.applied, 0);
    assert_eq!(summary.not_attempted, 1);
    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.slowest[0].action, Action::Failed);
}

#[test]
fn test_slowest_is_bounded_and_sorted() {
    let mut summary = RunSummary::new(RunMode::Seed, false, 25);
    for i in 0..25 {
        summary.record(&format!("{i:03}.sql"), Action::Apply, Some(i), false);
    }

    assert_eq!(summary.slowest.len(), MAX_TIMING_SAMPLES);
    assert_eq!(summary.slowest[0].execution_time_ms, 24);
    assert_eq!(summary.slowest[MAX_TIMING_SAMPLES - 1].execution_time_ms, 15);
}

#[test]
fn test_save_writes_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("target").join("migration_summary.json");

    let mut summary = RunSummary::new(RunMode::Baseline, false, 1);
    summary.record("001_init.sql", Action::Baselined, None, false);
    summary.finish(17);
    summary.save(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["mode"], "baseline");
    assert_eq!(json["outcome"], "success");
    assert_eq!(json["applied"], 1);
    assert_eq!(json["elapsed_ms"], 17);
    assert_eq!(json["force"], false);
    assert!(json["slowest"].as_array().unwrap().is_empty());
}
