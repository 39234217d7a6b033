//! Error types for keel-core

use thiserror::Error;

/// Core error type for Keel
#[derive(Error, Debug)]
pub enum CoreError {
    /// K001: Config file not found
    #[error("[K001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// K002: Failed to parse configuration file
    #[error("[K002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// K003: Invalid configuration value
    #[error("[K003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// K004: Change-script directory does not exist
    #[error("[K004] Script directory not found: {path}")]
    ScriptDirNotFound { path: String },

    /// K005: No database connection string in the environment
    #[error("[K005] No database connection string: set {primary} (or {fallback})")]
    DatabaseUrlMissing {
        primary: &'static str,
        fallback: &'static str,
    },

    /// K006: Invalid history table identifier
    #[error("[K006] Invalid SQL identifier '{name}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { name: String },

    /// K007: IO error
    #[error("[K007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// K008: IO error with file path context
    #[error("[K008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
