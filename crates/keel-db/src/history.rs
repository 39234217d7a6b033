//! History-table SQL for DuckDB
//!
//! Timestamps cross the driver boundary as epoch milliseconds so no
//! driver-side chrono support is needed.

use chrono::{DateTime, Utc};
use duckdb::Connection;
use keel_core::{HistoryRecord, HistorySnapshot, HistoryTable};

use crate::error::{DbError, DbResult};

fn history_error(table: &HistoryTable, message: impl Into<String>) -> DbError {
    DbError::HistoryError {
        table: table.qualified(),
        message: message.into(),
    }
}

/// DDL creating the schema and table if absent
pub(crate) fn create_table_sql(table: &HistoryTable) -> String {
    format!(
        "CREATE SCHEMA IF NOT EXISTS {schema};
         CREATE TABLE IF NOT EXISTS {table} (
             filename          VARCHAR PRIMARY KEY,
             fingerprint       VARCHAR NOT NULL,
             applied_at        TIMESTAMP NOT NULL,
             execution_time_ms BIGINT,
             success           BOOLEAN NOT NULL,
             error_message     VARCHAR
         );",
        schema = table.schema(),
        table = table.qualified(),
    )
}

pub(crate) fn ensure_table(conn: &Connection, table: &HistoryTable) -> DbResult<()> {
    conn.execute_batch(&create_table_sql(table))
        .map_err(|e| history_error(table, format!("create failed: {e}")))
}

pub(crate) fn fetch_all(conn: &Connection, table: &HistoryTable) -> DbResult<HistorySnapshot> {
    let sql = format!(
        "SELECT filename, fingerprint, epoch_ms(applied_at), execution_time_ms, success, error_message
         FROM {} ORDER BY filename",
        table.qualified()
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| history_error(table, format!("read failed: {e}")))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })
        .map_err(|e| history_error(table, format!("read failed: {e}")))?;

    let mut snapshot = HistorySnapshot::new();
    for row in rows {
        let (filename, fingerprint, applied_ms, execution_time_ms, success, error_message) =
            row.map_err(|e| history_error(table, format!("read failed: {e}")))?;
        let applied_at = DateTime::<Utc>::from_timestamp_millis(applied_ms).ok_or_else(|| {
            history_error(
                table,
                format!("applied_at out of range for {filename}: {applied_ms}"),
            )
        })?;
        snapshot.insert(
            filename.clone(),
            HistoryRecord {
                filename,
                fingerprint,
                applied_at,
                execution_time_ms,
                success,
                error_message,
            },
        );
    }
    Ok(snapshot)
}

pub(crate) fn upsert(
    conn: &Connection,
    table: &HistoryTable,
    record: &HistoryRecord,
) -> DbResult<()> {
    let sql = format!(
        "INSERT INTO {} (filename, fingerprint, applied_at, execution_time_ms, success, error_message)
         VALUES (?, ?, epoch_ms(CAST(? AS BIGINT)), ?, ?, ?)
         ON CONFLICT (filename) DO UPDATE SET
             fingerprint = excluded.fingerprint,
             applied_at = excluded.applied_at,
             execution_time_ms = excluded.execution_time_ms,
             success = excluded.success,
             error_message = excluded.error_message",
        table.qualified()
    );
    conn.execute(
        &sql,
        duckdb::params![
            record.filename,
            record.fingerprint,
            record.applied_at.timestamp_millis(),
            record.execution_time_ms,
            record.success,
            record.error_message,
        ],
    )
    .map_err(|e| history_error(table, format!("upsert of {} failed: {e}", record.filename)))?;
    Ok(())
}
