//! Migration executor
//!
//! Scripts are resolved strictly one at a time in catalog order. An executed
//! script writes a tentative `success = false` row before its transaction
//! opens, so a crash mid-apply leaves a row the next run retries.

use keel_core::status::{classify, status_of, CheckReport, StatusEntry};
use keel_core::{decide_migration, Action, Catalog, ChangeScript, HistoryRecord, HistorySnapshot};
use keel_core::{HistoryTable, RunMode, RunSummary};
use keel_db::Database;
use std::time::Instant;

use crate::error::{RunnerError, RunnerResult};
use crate::outcome::{RunReport, ScriptOutcome};

/// Applies migration scripts through an in-process connection
pub struct MigrationRunner<'a> {
    db: &'a dyn Database,
    table: HistoryTable,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(db: &'a dyn Database, table: HistoryTable) -> Self {
        Self { db, table }
    }

    /// History table this runner reads and writes
    pub fn table(&self) -> &HistoryTable {
        &self.table
    }

    /// Create the history table if needed and read it
    async fn load_history(&self) -> RunnerResult<HistorySnapshot> {
        self.db.ensure_history_table(&self.table).await?;
        Ok(self.db.fetch_history(&self.table).await?)
    }

    /// Read history without creating anything; a missing table reads as empty
    pub async fn read_history(&self) -> RunnerResult<HistorySnapshot> {
        if self.db.relation_exists(&self.table.qualified()).await? {
            Ok(self.db.fetch_history(&self.table).await?)
        } else {
            Ok(HistorySnapshot::new())
        }
    }

    /// Apply every pending script, halting at the first failure.
    ///
    /// Divergent scripts are blocked (and reported) unless `force` is set,
    /// in which case they are re-applied. `on_outcome` sees every decision as
    /// soon as it is final.
    pub async fn apply<F>(
        &self,
        catalog: &Catalog,
        force: bool,
        mut on_outcome: F,
    ) -> RunnerResult<RunReport>
    where
        F: FnMut(&ScriptOutcome),
    {
        let start = Instant::now();
        let history = self.load_history().await?;
        let mut report = RunReport::new(RunSummary::new(RunMode::Apply, force, catalog.len()));

        for script in catalog {
            let action = decide_migration(script, history.get(&script.filename), force);
            log::debug!("{}: {}", script.filename, action);

            let outcome = if action.executes() {
                self.execute(script, action).await?
            } else {
                ScriptOutcome::decided(&script.filename, action)
            };

            on_outcome(&outcome);
            let failed = outcome.is_failure();
            report.push(outcome);

            if failed {
                // Later scripts may depend on this one
                report.halted = true;
                break;
            }
        }

        report.summary.finish(start.elapsed().as_millis() as u64);
        Ok(report)
    }

    /// Run one script in a transaction and record the result
    async fn execute(&self, script: &ChangeScript, action: Action) -> RunnerResult<ScriptOutcome> {
        self.db
            .upsert_history(&self.table, &HistoryRecord::tentative(script))
            .await?;

        let start = Instant::now();
        let result = self.db.execute_in_transaction(&script.content).await;
        let elapsed_ms = start.elapsed().as_millis() as i64;

        let mut outcome = ScriptOutcome::decided(&script.filename, action);
        outcome.execution_time_ms = Some(elapsed_ms);

        match result {
            Ok(()) => {
                self.db
                    .upsert_history(&self.table, &HistoryRecord::succeeded(script, elapsed_ms))
                    .await?;
                log::debug!("{} applied in {}ms", script.filename, elapsed_ms);
            }
            Err(e) => {
                let message = e.to_string();
                self.record_failure(script, elapsed_ms, &message).await?;
                log::debug!("{} failed after {}ms: {}", script.filename, elapsed_ms, message);
                outcome.error = Some(message);
            }
        }
        Ok(outcome)
    }

    /// Write the failed row, keeping the script error if that write fails too
    async fn record_failure(
        &self,
        script: &ChangeScript,
        elapsed_ms: i64,
        message: &str,
    ) -> RunnerResult<()> {
        let record = HistoryRecord::failed(script, elapsed_ms, message);
        self.db
            .upsert_history(&self.table, &record)
            .await
            .map_err(|source| {
                log::error!("{} failed: {}", script.filename, message);
                RunnerError::FailureNotRecorded {
                    filename: script.filename.clone(),
                    script_error: message.to_string(),
                    source,
                }
            })
    }

    /// Record every script not yet applied as applied, without running SQL.
    pub async fn baseline<F>(&self, catalog: &Catalog, mut on_outcome: F) -> RunnerResult<RunReport>
    where
        F: FnMut(&ScriptOutcome),
    {
        let start = Instant::now();
        let history = self.load_history().await?;
        let mut report =
            RunReport::new(RunSummary::new(RunMode::Baseline, false, catalog.len()));

        for script in catalog {
            let current = history
                .get(&script.filename)
                .is_some_and(|r| r.is_current(script));

            let action = if current {
                Action::Skip
            } else {
                self.db
                    .upsert_history(&self.table, &HistoryRecord::baselined(script))
                    .await?;
                log::debug!("{} baselined", script.filename);
                Action::Baselined
            };

            let outcome = ScriptOutcome::decided(&script.filename, action);
            on_outcome(&outcome);
            report.push(outcome);
        }

        report.summary.finish(start.elapsed().as_millis() as u64);
        Ok(report)
    }

    /// Read-only `--status` report
    pub async fn status(&self, catalog: &Catalog) -> RunnerResult<Vec<StatusEntry>> {
        let history = self.read_history().await?;
        Ok(status_of(catalog, &history))
    }

    /// Read-only up-to-date / pending / divergent classification
    pub async fn check(&self, catalog: &Catalog) -> RunnerResult<CheckReport> {
        let history = self.read_history().await?;
        Ok(classify(catalog, &history))
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
