//! Per-script outcomes and run reports

use keel_core::{Action, RunSummary};

/// Decision and result for one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub filename: String,

    /// Decision taken for the script
    pub action: Action,

    /// Measured execution time, when the script was executed
    pub execution_time_ms: Option<i64>,

    /// Error text when execution failed
    pub error: Option<String>,
}

impl ScriptOutcome {
    pub(crate) fn decided(filename: &str, action: Action) -> Self {
        Self {
            filename: filename.to_string(),
            action,
            execution_time_ms: None,
            error: None,
        }
    }

    /// True when the script was executed and failed
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything one run did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Outcomes in catalog order; scripts after a halt are absent
    pub outcomes: Vec<ScriptOutcome>,

    /// Aggregate counts for the summary file
    pub summary: RunSummary,

    /// The run stopped at a failing script
    pub halted: bool,
}

impl RunReport {
    pub(crate) fn new(summary: RunSummary) -> Self {
        Self {
            outcomes: Vec::new(),
            summary,
            halted: false,
        }
    }

    pub(crate) fn push(&mut self, outcome: ScriptOutcome) {
        self.summary.record(
            &outcome.filename,
            outcome.action,
            outcome.execution_time_ms,
            outcome.is_failure(),
        );
        self.outcomes.push(outcome);
    }

    /// Number of failed scripts
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Outcomes with the given action
    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &ScriptOutcome> {
        self.outcomes.iter().filter(move |o| o.action == action)
    }
}
