//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::history;
use crate::traits::{DatabaseCore, DatabaseHistory};
use async_trait::async_trait;
use duckdb::Connection;
use keel_core::{HistoryRecord, HistorySnapshot, HistoryTable};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Memory,
    File(PathBuf),
}

/// DuckDB database backend
///
/// The connection is opened lazily and can be released with
/// [`DatabaseCore::disconnect`], which matters because DuckDB lets only one
/// process hold a database file open for writing.
pub struct DuckDbBackend {
    target: Target,
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            target: Target::Memory,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = open_file(path)?;
        Ok(Self {
            target: Target::File(path.to_path_buf()),
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create from a connection string.
    ///
    /// Accepts `:memory:`, a filesystem path, `duckdb:///abs/path`, or
    /// `duckdb://rel/path`.
    pub fn new(url: &str) -> DbResult<Self> {
        match parse_url(url)? {
            Target::Memory => Self::in_memory(),
            Target::File(path) => Self::from_path(&path),
        }
    }

    /// Filesystem path of the database, if file-backed
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::Memory => None,
            Target::File(p) => Some(p),
        }
    }

    /// Run `f` against the connection, reopening it if it was released
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        if guard.is_none() {
            if let Target::File(path) = &self.target {
                log::debug!("Reopening DuckDB connection to {}", path.display());
                *guard = Some(open_file(path)?);
            }
        }
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(DbError::ConnectionError(
                "in-memory database connection was closed".to_string(),
            )),
        }
    }

    fn execute_in_transaction_sync(&self, sql: &str) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch("BEGIN TRANSACTION")
                .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

            if let Err(e) = conn.execute_batch(sql) {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    log::warn!("ROLLBACK failed: {rollback_err}");
                }
                return Err(DbError::ExecutionError(e.to_string()));
            }

            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(DbError::TransactionError(format!(
                    "COMMIT failed: {commit_err}"
                )));
            }
            Ok(())
        })
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        // Handle schema-qualified names
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    fn disconnect_sync(&self) -> DbResult<()> {
        if self.target == Target::Memory {
            // Closing would discard the database
            return Ok(());
        }
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| DbError::ConnectionError(format!("close failed: {e}"))),
            None => Ok(()),
        }
    }
}

fn open_file(path: &Path) -> DbResult<Connection> {
    Connection::open(path).map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))
}

fn parse_url(url: &str) -> DbResult<Target> {
    let url = url.trim();
    let rest = match url.split_once("://") {
        Some(("duckdb", rest)) => rest,
        Some(_) => return Err(DbError::UnsupportedUrl(url.to_string())),
        None => url,
    };
    match rest {
        "" => Err(DbError::UnsupportedUrl(url.to_string())),
        ":memory:" | "memory" => Ok(Target::Memory),
        path => Ok(Target::File(PathBuf::from(path))),
    }
}

#[async_trait]
impl DatabaseCore for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(sql)
                .map_err(|e| DbError::ExecutionError(e.to_string()))
        })
    }

    async fn execute_in_transaction(&self, sql: &str) -> DbResult<()> {
        self.execute_in_transaction_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn disconnect(&self) -> DbResult<()> {
        self.disconnect_sync()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[async_trait]
impl DatabaseHistory for DuckDbBackend {
    async fn ensure_history_table(&self, table: &HistoryTable) -> DbResult<()> {
        self.with_conn(|conn| history::ensure_table(conn, table))
    }

    async fn fetch_history(&self, table: &HistoryTable) -> DbResult<HistorySnapshot> {
        self.with_conn(|conn| history::fetch_all(conn, table))
    }

    async fn upsert_history(&self, table: &HistoryTable, record: &HistoryRecord) -> DbResult<()> {
        self.with_conn(|conn| history::upsert(conn, table, record))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
