//! keel-db - Database abstraction layer for Keel
//!
//! This crate provides the `Database` traits, the history-table SQL, and the
//! DuckDB implementation used by both executors.

pub mod duckdb;
pub mod error;
pub(crate) mod history;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Database, DatabaseCore, DatabaseHistory};
