use super::*;
use crate::catalog::ChangeScript;
use crate::history::HistoryRecord;
use std::path::PathBuf;

fn script(name: &str, content: &str) -> ChangeScript {
    ChangeScript::new(name, PathBuf::from(name), content)
}

fn catalog(scripts: Vec<ChangeScript>) -> Catalog {
    Catalog::from_scripts(PathBuf::from("db/migrations"), scripts)
}

/// applied, edited-after-apply, failed, never run
fn mixed_fixture() -> (Catalog, HistorySnapshot) {
    let a = script("001_a.sql", "SELECT 1");
    let b_old = script("002_b.sql", "SELECT 2");
    let b_new = script("002_b.sql", "SELECT 22");
    let c = script("003_c.sql", "SELECT 3");
    let d = script("004_d.sql", "SELECT 4");

    let mut history = HistorySnapshot::new();
    history.insert(a.filename.clone(), HistoryRecord::succeeded(&a, 5));
    history.insert(b_old.filename.clone(), HistoryRecord::succeeded(&b_old, 5));
    history.insert(c.filename.clone(), HistoryRecord::failed(&c, 5, "syntax error"));

    (catalog(vec![a, b_new, c, d]), history)
}

#[test]
fn test_status_classes() {
    let (catalog, history) = mixed_fixture();
    let entries = status_of(&catalog, &history);

    let classes: Vec<StatusClass> = entries.iter().map(|e| e.class).collect();
    assert_eq!(
        classes,
        vec![
            StatusClass::Applied,
            StatusClass::Applied,
            StatusClass::Error,
            StatusClass::Pending
        ]
    );
    assert!(!entries[0].modified);
    assert!(entries[1].modified);
    assert_eq!(entries[2].error_message.as_deref(), Some("syntax error"));
}

#[test]
fn test_status_is_stable_for_same_inputs() {
    let (catalog, history) = mixed_fixture();
    assert_eq!(status_of(&catalog, &history), status_of(&catalog, &history));
}

#[test]
fn test_classify_mixed() {
    let (catalog, history) = mixed_fixture();
    let report = classify(&catalog, &history);

    assert_eq!(report.count(ScriptState::UpToDate), 1);
    assert_eq!(report.count(ScriptState::Divergent), 1);
    // Failed and never-run both count as pending
    assert_eq!(report.count(ScriptState::Pending), 2);
    assert_eq!(report.filenames(ScriptState::Divergent), vec!["002_b.sql"]);
    assert_eq!(report.exit_code(), EXIT_DIVERGENT);
}

#[test]
fn test_classify_clean() {
    let a = script("001_a.sql", "SELECT 1");
    let mut history = HistorySnapshot::new();
    history.insert(a.filename.clone(), HistoryRecord::succeeded(&a, 1));

    let report = classify(&catalog(vec![a]), &history);
    assert_eq!(report.exit_code(), EXIT_CLEAN);
}

#[test]
fn test_classify_pending_only() {
    let a = script("001_a.sql", "SELECT 1");
    let b = script("002_b.sql", "SELECT 2");
    let mut history = HistorySnapshot::new();
    history.insert(a.filename.clone(), HistoryRecord::succeeded(&a, 1));

    let report = classify(&catalog(vec![a, b]), &history);
    assert_eq!(report.exit_code(), EXIT_PENDING);
}

#[test]
fn test_classify_empty_catalog_is_clean() {
    let report = classify(&Catalog::default(), &HistorySnapshot::new());
    assert!(report.entries.is_empty());
    assert_eq!(report.exit_code(), EXIT_CLEAN);
}

#[test]
fn test_history_for_removed_scripts_is_ignored() {
    let a = script("001_a.sql", "SELECT 1");
    let gone = script("000_gone.sql", "SELECT 0");
    let mut history = HistorySnapshot::new();
    history.insert(a.filename.clone(), HistoryRecord::succeeded(&a, 1));
    history.insert(gone.filename.clone(), HistoryRecord::succeeded(&gone, 1));

    let report = classify(&catalog(vec![a]), &history);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.exit_code(), EXIT_CLEAN);
}
