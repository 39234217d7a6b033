use super::*;
use chrono::{DateTime, Utc};
use keel_core::ChangeScript;
use tempfile::TempDir;

fn table() -> HistoryTable {
    HistoryTable::new("keel", "schema_migrations").unwrap()
}

fn script(name: &str, content: &str) -> ChangeScript {
    ChangeScript::new(name, PathBuf::from(name), content)
}

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
    assert!(db.path().is_none());
}

#[test]
fn test_parse_url() {
    assert_eq!(parse_url(":memory:").unwrap(), Target::Memory);
    assert_eq!(parse_url("duckdb://:memory:").unwrap(), Target::Memory);
    assert_eq!(
        parse_url("app.duckdb").unwrap(),
        Target::File(PathBuf::from("app.duckdb"))
    );
    assert_eq!(
        parse_url("duckdb:///var/lib/app.duckdb").unwrap(),
        Target::File(PathBuf::from("/var/lib/app.duckdb"))
    );
    assert_eq!(
        parse_url("duckdb://data/app.duckdb").unwrap(),
        Target::File(PathBuf::from("data/app.duckdb"))
    );
    assert!(matches!(
        parse_url("postgres://localhost/app"),
        Err(DbError::UnsupportedUrl(_))
    ));
    assert!(matches!(parse_url("duckdb://"), Err(DbError::UnsupportedUrl(_))));
}

#[tokio::test]
async fn test_ensure_history_table_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.ensure_history_table(&table()).await.unwrap();
    db.ensure_history_table(&table()).await.unwrap();

    assert!(db.relation_exists("keel.schema_migrations").await.unwrap());
    assert!(db.fetch_history(&table()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upsert_inserts_then_replaces() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.ensure_history_table(&table()).await.unwrap();

    let s = script("001_init.sql", "CREATE TABLE a (id INT);");
    db.upsert_history(&table(), &HistoryRecord::tentative(&s))
        .await
        .unwrap();

    let history = db.fetch_history(&table()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history["001_init.sql"].success);
    assert!(history["001_init.sql"].execution_time_ms.is_none());

    db.upsert_history(&table(), &HistoryRecord::succeeded(&s, 42))
        .await
        .unwrap();

    let history = db.fetch_history(&table()).await.unwrap();
    assert_eq!(history.len(), 1);
    let record = &history["001_init.sql"];
    assert!(record.success);
    assert_eq!(record.execution_time_ms, Some(42));
    assert_eq!(record.fingerprint, s.fingerprint);
    assert!(record.error_message.is_none());
}

#[tokio::test]
async fn test_upsert_replaces_all_fields() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.ensure_history_table(&table()).await.unwrap();

    let s = script("001_init.sql", "SELECT 1;");
    db.upsert_history(&table(), &HistoryRecord::failed(&s, 5, "boom"))
        .await
        .unwrap();
    db.upsert_history(&table(), &HistoryRecord::baselined(&s))
        .await
        .unwrap();

    let record = db.fetch_history(&table()).await.unwrap().remove("001_init.sql").unwrap();
    assert!(record.success);
    // Not a partial patch: stale error and timing are cleared
    assert!(record.error_message.is_none());
    assert!(record.execution_time_ms.is_none());
}

#[tokio::test]
async fn test_applied_at_round_trips_to_the_millisecond() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.ensure_history_table(&table()).await.unwrap();

    let s = script("001_init.sql", "SELECT 1;");
    let mut record = HistoryRecord::succeeded(&s, 1);
    record.applied_at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
    db.upsert_history(&table(), &record).await.unwrap();

    let loaded = db.fetch_history(&table()).await.unwrap().remove("001_init.sql").unwrap();
    assert_eq!(loaded.applied_at, record.applied_at);
}

#[tokio::test]
async fn test_separate_tables_are_independent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let seeds = HistoryTable::new("keel", "seed_history").unwrap();
    db.ensure_history_table(&table()).await.unwrap();
    db.ensure_history_table(&seeds).await.unwrap();

    let s = script("001_init.sql", "SELECT 1;");
    db.upsert_history(&seeds, &HistoryRecord::succeeded(&s, 1))
        .await
        .unwrap();

    assert!(db.fetch_history(&table()).await.unwrap().is_empty());
    assert_eq!(db.fetch_history(&seeds).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transaction_commits() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_in_transaction("CREATE TABLE t1 (id INT); INSERT INTO t1 VALUES (1);")
        .await
        .unwrap();
    assert!(db.relation_exists("t1").await.unwrap());
}

#[tokio::test]
async fn test_transaction_rolls_back_on_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .execute_in_transaction("CREATE TABLE t1 (id INT); SELECT * FROM missing_table;")
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ExecutionError(_)));
    assert!(!db.relation_exists("t1").await.unwrap());

    // Connection is usable again after the rollback
    db.execute_batch("CREATE TABLE t2 (id INT)").await.unwrap();
    assert!(db.relation_exists("t2").await.unwrap());
}

#[tokio::test]
async fn test_disconnect_reopens_file_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.duckdb");
    let db = DuckDbBackend::from_path(&path).unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    db.disconnect().await.unwrap();
    db.disconnect().await.unwrap();

    assert!(db.relation_exists("t").await.unwrap());
}

#[tokio::test]
async fn test_disconnect_keeps_in_memory_data() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();
    db.disconnect().await.unwrap();
    assert!(db.relation_exists("t").await.unwrap());
}
