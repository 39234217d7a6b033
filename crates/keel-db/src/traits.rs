//! Database trait definitions
//!
//! Split by concern: [`DatabaseCore`] runs SQL, [`DatabaseHistory`] owns the
//! history tables. [`Database`] is the umbrella every backend implements.

use crate::error::DbResult;
use async_trait::async_trait;
use keel_core::{HistoryRecord, HistorySnapshot, HistoryTable};

/// SQL execution
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute multiple SQL statements in autocommit mode
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute `sql` as one batch inside `BEGIN` / `COMMIT`.
    ///
    /// On any error the transaction is rolled back before returning.
    async fn execute_in_transaction(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists (`schema.name` or bare `name`)
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Close the underlying connection; the next call reopens it.
    ///
    /// Lets an external client take the database lock between calls.
    async fn disconnect(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// History-table access, one table per executor
#[async_trait]
pub trait DatabaseHistory: Send + Sync {
    /// Create the schema and history table if they do not exist
    async fn ensure_history_table(&self, table: &HistoryTable) -> DbResult<()>;

    /// Read every record, keyed by filename
    async fn fetch_history(&self, table: &HistoryTable) -> DbResult<HistorySnapshot>;

    /// Insert or replace every column of the row for `record.filename`
    async fn upsert_history(&self, table: &HistoryTable, record: &HistoryRecord) -> DbResult<()>;
}

/// Full database capability used by the executors
pub trait Database: DatabaseCore + DatabaseHistory {}

impl<T: DatabaseCore + DatabaseHistory> Database for T {}
