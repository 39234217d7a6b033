use super::*;
use std::path::PathBuf;

fn script(content: &str) -> ChangeScript {
    ChangeScript::new("001_init.sql", PathBuf::from("001_init.sql"), content)
}

#[test]
fn test_migration_without_history_applies() {
    let s = script("CREATE TABLE a (id INT)");
    assert_eq!(decide_migration(&s, None, false), Action::Apply);
    assert_eq!(decide_migration(&s, None, true), Action::Apply);
}

#[test]
fn test_migration_failed_history_retries() {
    let s = script("CREATE TABLE a (id INT)");
    let record = HistoryRecord::failed(&s, 3, "boom");
    assert_eq!(decide_migration(&s, Some(&record), false), Action::Retry);

    // A failed row is retried even when the content changed since
    let edited = script("CREATE TABLE a (id BIGINT)");
    assert_eq!(decide_migration(&edited, Some(&record), false), Action::Retry);
}

#[test]
fn test_migration_tentative_history_retries() {
    let s = script("CREATE TABLE a (id INT)");
    let record = HistoryRecord::tentative(&s);
    assert_eq!(decide_migration(&s, Some(&record), false), Action::Retry);
}

#[test]
fn test_migration_matching_history_skips() {
    let s = script("CREATE TABLE a (id INT)");
    let record = HistoryRecord::succeeded(&s, 10);
    assert_eq!(decide_migration(&s, Some(&record), false), Action::Skip);
    assert_eq!(decide_migration(&s, Some(&record), true), Action::Skip);
}

#[test]
fn test_migration_divergent_blocks_without_force() {
    let original = script("CREATE TABLE a (id INT)");
    let record = HistoryRecord::succeeded(&original, 10);
    let edited = script("CREATE TABLE a (id BIGINT)");

    assert_eq!(decide_migration(&edited, Some(&record), false), Action::Blocked);
    assert_eq!(decide_migration(&edited, Some(&record), true), Action::Forced);
}

#[test]
fn test_seed_divergent_reapplies() {
    let original = script("INSERT INTO a VALUES (1)");
    let record = HistoryRecord::succeeded(&original, 10);
    let edited = script("INSERT INTO a VALUES (2)");

    assert_eq!(decide_seed(&edited, Some(&record)), Action::Reapply);
    assert_eq!(decide_seed(&original, Some(&record)), Action::Skip);
    assert_eq!(decide_seed(&original, None), Action::Apply);
    assert_eq!(
        decide_seed(&original, Some(&HistoryRecord::failed(&original, 1, "x"))),
        Action::Retry
    );
}

#[test]
fn test_action_predicates() {
    assert!(Action::Apply.executes());
    assert!(Action::Retry.executes());
    assert!(Action::Forced.executes());
    assert!(Action::Reapply.executes());
    assert!(!Action::Skip.executes());
    assert!(!Action::Blocked.executes());
    assert!(!Action::Baselined.executes());

    assert!(Action::Blocked.is_divergent());
    assert!(Action::Forced.is_divergent());
    assert!(!Action::Retry.is_divergent());
}

#[test]
fn test_action_display_matches_serde() {
    for action in [Action::Apply, Action::Blocked, Action::Baselined] {
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, format!("\"{}\"", action));
    }
}
