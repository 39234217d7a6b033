//! Run summary written once per invocation for external automation
//!
//! The summary is never read back by Keel itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::decision::Action;
use crate::error::{CoreError, CoreResult};

/// Number of per-script timings kept in a summary
pub const MAX_TIMING_SAMPLES: usize = 10;

/// Which kind of run produced the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Apply,
    Baseline,
    Seed,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Apply => write!(f, "apply"),
            RunMode::Baseline => write!(f, "baseline"),
            RunMode::Seed => write!(f, "seed"),
        }
    }
}

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Nothing failed and nothing was blocked
    Success,
    /// At least one divergent migration was blocked
    Divergent,
    /// A script failed to execute
    Failed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => write!(f, "success"),
            RunOutcome::Divergent => write!(f, "divergent"),
            RunOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Timing of one executed script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptTiming {
    pub filename: String,
    pub action: Action,
    pub execution_time_ms: i64,
}

/// Aggregate of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Utc>,
    pub mode: RunMode,
    pub force: bool,
    pub outcome: RunOutcome,
    /// Scripts in the catalog
    pub total: usize,
    pub applied: usize,
    pub skipped: usize,
    /// Blocked, forced, and re-applied scripts
    pub divergent: usize,
    pub failed: usize,
    /// Scripts left untouched because the run halted first
    pub not_attempted: usize,
    pub elapsed_ms: u64,
    /// Slowest executed scripts, slowest first
    pub slowest: Vec<ScriptTiming>,
}

impl RunSummary {
    /// Start a summary for a catalog of `total` scripts
    pub fn new(mode: RunMode, force: bool, total: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            mode,
            force,
            outcome: RunOutcome::Success,
            total,
            applied: 0,
            skipped: 0,
            divergent: 0,
            failed: 0,
            not_attempted: total,
            elapsed_ms: 0,
            slowest: Vec::new(),
        }
    }

    /// Count one resolved script.
    ///
    /// `action` is the decision taken; `failed` is set when an executing
    /// action did not complete.
    pub fn record(
        &mut self,
        filename: &str,
        action: Action,
        execution_time_ms: Option<i64>,
        failed: bool,
    ) {
        self.not_attempted = self.not_attempted.saturating_sub(1);

        if action.is_divergent() {
            self.divergent += 1;
        }

        if failed {
            self.failed += 1;
            self.outcome = RunOutcome::Failed;
        } else {
            match action {
                Action::Skip => self.skipped += 1,
                Action::Blocked => {
                    if self.outcome == RunOutcome::Success {
                        self.outcome = RunOutcome::Divergent;
                    }
                }
                Action::Failed => {
                    self.failed += 1;
                    self.outcome = RunOutcome::Failed;
                }
                _ => self.applied += 1,
            }
        }

        if let Some(ms) = execution_time_ms {
            self.push_timing(ScriptTiming {
                filename: filename.to_string(),
                action: if failed { Action::Failed } else { action },
                execution_time_ms: ms,
            });
        }
    }

    fn push_timing(&mut self, timing: ScriptTiming) {
        self.slowest.push(timing);
        self.slowest
            .sort_by(|a, b| b.execution_time_ms.cmp(&a.execution_time_ms));
        self.slowest.truncate(MAX_TIMING_SAMPLES);
    }

    /// Stamp the total elapsed time
    pub fn finish(&mut self, elapsed_ms: u64) {
        self.elapsed_ms = elapsed_ms;
    }

    /// Write the summary as pretty JSON.
    ///
    /// Uses write-to-temp-then-rename so readers never see a partial file.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let temp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&temp_path, &json).map_err(|e| CoreError::IoWithPath {
            path: temp_path.display().to_string(),
            source: e,
        })?;
        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
