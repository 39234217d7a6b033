//! Per-script decision rules
//!
//! Both executors share one model: compare the script's fingerprint against
//! its history record and pick an action. They differ only in what a
//! divergent script means. Migrations block unless forced, seeds re-apply.

use serde::Serialize;
use std::fmt;

use crate::catalog::ChangeScript;
use crate::history::HistoryRecord;

/// What happened (or will happen) to one script in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Never recorded, run it
    Apply,
    /// Last attempt failed, run it again
    Retry,
    /// Recorded as applied with the same fingerprint
    Skip,
    /// Migration changed after it was applied and `--force` is off
    Blocked,
    /// Migration changed after it was applied, re-run under `--force`
    Forced,
    /// Seed changed after it was applied, re-run automatically
    Reapply,
    /// Marked applied without executing SQL
    Baselined,
    /// Execution was attempted and failed
    Failed,
}

impl Action {
    /// True for actions that execute the script
    pub fn executes(self) -> bool {
        matches!(
            self,
            Action::Apply | Action::Retry | Action::Forced | Action::Reapply
        )
    }

    /// True for actions that involve a divergent script
    pub fn is_divergent(self) -> bool {
        matches!(self, Action::Blocked | Action::Forced | Action::Reapply)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Apply => write!(f, "apply"),
            Action::Retry => write!(f, "retry"),
            Action::Skip => write!(f, "skip"),
            Action::Blocked => write!(f, "blocked"),
            Action::Forced => write!(f, "forced"),
            Action::Reapply => write!(f, "reapply"),
            Action::Baselined => write!(f, "baselined"),
            Action::Failed => write!(f, "failed"),
        }
    }
}

/// Decide what to do with a migration given its history record
pub fn decide_migration(
    script: &ChangeScript,
    record: Option<&HistoryRecord>,
    force: bool,
) -> Action {
    match record {
        None => Action::Apply,
        Some(r) if !r.success => Action::Retry,
        Some(r) if r.is_current(script) => Action::Skip,
        Some(_) if force => Action::Forced,
        Some(_) => Action::Blocked,
    }
}

/// Decide what to do with a seed given its history record
pub fn decide_seed(script: &ChangeScript, record: Option<&HistoryRecord>) -> Action {
    match record {
        None => Action::Apply,
        Some(r) if !r.success => Action::Retry,
        Some(r) if r.is_current(script) => Action::Skip,
        Some(_) => Action::Reapply,
    }
}

#[cfg(test)]
#[path = "decision_test.rs"]
mod tests;
