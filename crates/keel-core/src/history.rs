//! History records: what has happened to each change-script

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::catalog::ChangeScript;
use crate::error::{CoreError, CoreResult};

/// One row of a history table, unique on `filename`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Script file name (conflict key)
    pub filename: String,

    /// Fingerprint of the content at the last write
    pub fingerprint: String,

    /// Time of the last write
    pub applied_at: DateTime<Utc>,

    /// Execution time of the last attempt; `None` for tentative or baselined rows
    pub execution_time_ms: Option<i64>,

    /// Whether the last attempt succeeded
    pub success: bool,

    /// Error text of the last failed attempt
    pub error_message: Option<String>,
}

impl HistoryRecord {
    /// Intent row written before an apply attempt
    pub fn tentative(script: &ChangeScript) -> Self {
        Self {
            filename: script.filename.clone(),
            fingerprint: script.fingerprint.clone(),
            applied_at: Utc::now(),
            execution_time_ms: None,
            success: false,
            error_message: None,
        }
    }

    /// Row for a successful apply
    pub fn succeeded(script: &ChangeScript, execution_time_ms: i64) -> Self {
        Self {
            execution_time_ms: Some(execution_time_ms),
            success: true,
            ..Self::tentative(script)
        }
    }

    /// Row for a failed apply
    pub fn failed(script: &ChangeScript, execution_time_ms: i64, error: impl Into<String>) -> Self {
        Self {
            execution_time_ms: Some(execution_time_ms),
            error_message: Some(error.into()),
            ..Self::tentative(script)
        }
    }

    /// Row for a script marked applied without running it
    pub fn baselined(script: &ChangeScript) -> Self {
        Self {
            success: true,
            ..Self::tentative(script)
        }
    }

    /// True when this record says `script` is durably applied as-is
    pub fn is_current(&self, script: &ChangeScript) -> bool {
        self.success && self.fingerprint == script.fingerprint
    }

    /// True when a successful record no longer matches the script content
    pub fn is_divergent(&self, script: &ChangeScript) -> bool {
        self.success && self.fingerprint != script.fingerprint
    }
}

/// Full contents of a history table, keyed by filename
pub type HistorySnapshot = HashMap<String, HistoryRecord>;

/// Schema-qualified identity of a history table
///
/// Both parts are validated identifiers so they can be interpolated into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryTable {
    schema: String,
    name: String,
}

impl HistoryTable {
    /// Create a table identity, validating both identifiers
    pub fn new(schema: &str, name: &str) -> CoreResult<Self> {
        validate_identifier(schema)?;
        validate_identifier(name)?;
        Ok(Self {
            schema: schema.to_string(),
            name: name.to_string(),
        })
    }

    /// Schema part
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Table name part
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `schema.name`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl fmt::Display for HistoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Check that `name` is a plain unquoted SQL identifier
pub fn validate_identifier(name: &str) -> CoreResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
