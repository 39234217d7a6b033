//! Read-only comparison of a catalog against a history snapshot
//!
//! Two views are provided. [`status_of`] backs `keel migrate --status` and
//! reports what the history table says about each script. [`classify`] backs
//! `keel check` and reports whether each script is up to date, still pending,
//! or divergent, with a distinct exit code per class.

use serde::Serialize;
use std::fmt;

use crate::catalog::Catalog;
use crate::history::HistorySnapshot;

/// Exit code: every script is up to date
pub const EXIT_CLEAN: i32 = 0;
/// Exit code: some scripts are pending, none divergent
pub const EXIT_PENDING: i32 = 1;
/// Exit code: at least one script is divergent
pub const EXIT_DIVERGENT: i32 = 2;
/// Exit code: the check could not be performed
pub const EXIT_ERROR: i32 = 3;

/// History-table view of a script, used by `--status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    /// Last attempt succeeded
    Applied,
    /// Last attempt failed
    Error,
    /// Never attempted
    Pending,
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Applied => write!(f, "applied"),
            StatusClass::Error => write!(f, "error"),
            StatusClass::Pending => write!(f, "pending"),
        }
    }
}

/// One line of the `--status` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub filename: String,
    pub class: StatusClass,
    /// Applied, but the file has changed since
    pub modified: bool,
    pub error_message: Option<String>,
}

/// Build the `--status` report
pub fn status_of(catalog: &Catalog, history: &HistorySnapshot) -> Vec<StatusEntry> {
    catalog
        .iter()
        .map(|script| match history.get(&script.filename) {
            None => StatusEntry {
                filename: script.filename.clone(),
                class: StatusClass::Pending,
                modified: false,
                error_message: None,
            },
            Some(record) if record.success => StatusEntry {
                filename: script.filename.clone(),
                class: StatusClass::Applied,
                modified: record.fingerprint != script.fingerprint,
                error_message: None,
            },
            Some(record) => StatusEntry {
                filename: script.filename.clone(),
                class: StatusClass::Error,
                modified: false,
                error_message: record.error_message.clone(),
            },
        })
        .collect()
}

/// Reconciliation state of a script, used by `keel check`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptState {
    /// Applied with the current fingerprint
    UpToDate,
    /// Not yet applied, or last attempt failed
    Pending,
    /// Applied, but with a different fingerprint
    Divergent,
}

impl fmt::Display for ScriptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptState::UpToDate => write!(f, "up-to-date"),
            ScriptState::Pending => write!(f, "pending"),
            ScriptState::Divergent => write!(f, "divergent"),
        }
    }
}

/// Result of [`classify`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// `(filename, state)` in catalog order
    pub entries: Vec<(String, ScriptState)>,
}

impl CheckReport {
    /// Number of scripts in `state`
    pub fn count(&self, state: ScriptState) -> usize {
        self.entries.iter().filter(|(_, s)| *s == state).count()
    }

    /// Filenames of scripts in `state`
    pub fn filenames(&self, state: ScriptState) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, s)| *s == state)
            .map(|(f, _)| f.as_str())
            .collect()
    }

    /// Divergence outranks pending; pending outranks clean.
    pub fn exit_code(&self) -> i32 {
        if self.count(ScriptState::Divergent) > 0 {
            EXIT_DIVERGENT
        } else if self.count(ScriptState::Pending) > 0 {
            EXIT_PENDING
        } else {
            EXIT_CLEAN
        }
    }
}

/// Classify every catalog script against the history snapshot
pub fn classify(catalog: &Catalog, history: &HistorySnapshot) -> CheckReport {
    let entries = catalog
        .iter()
        .map(|script| {
            let state = match history.get(&script.filename) {
                Some(record) if record.is_current(script) => ScriptState::UpToDate,
                Some(record) if record.is_divergent(script) => ScriptState::Divergent,
                _ => ScriptState::Pending,
            };
            (script.filename.clone(), state)
        })
        .collect();
    CheckReport { entries }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
