//! Error types for keel-runner

use keel_core::CoreError;
use keel_db::DbError;
use thiserror::Error;

/// Executor errors
///
/// Script-level failures are recorded in history rather than returned; these
/// variants cover everything that stops a run from being carried out.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Database or history-table failure (R001)
    #[error("[R001] {0}")]
    Db(#[from] DbError),

    /// Configuration or catalog failure (R002)
    #[error("[R002] {0}")]
    Core(#[from] CoreError),

    /// External client not found on PATH (R003)
    #[error("[R003] SQL client '{program}' not found on PATH")]
    ClientNotFound { program: String },

    /// External client cannot run against this database (R004)
    #[error("[R004] SQL client unusable: {0}")]
    ClientConfig(String),

    /// External client could not be started (R005)
    #[error("[R005] Failed to start '{program}': {source}")]
    ClientSpawn {
        program: String,
        source: std::io::Error,
    },

    /// External client exited unsuccessfully (R006)
    #[error("[R006] SQL client exited with {status}: {stderr}")]
    ClientFailed { status: String, stderr: String },

    /// A script failed and its failure could not be written to history (R007)
    #[error("[R007] {filename} failed ({script_error}) and the failure could not be recorded: {source}")]
    FailureNotRecorded {
        filename: String,
        script_error: String,
        source: DbError,
    },
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
