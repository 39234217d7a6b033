//! Seed executor
//!
//! Seeds are idempotent data scripts. A changed seed is re-applied on the
//! next run, and a failing seed does not stop the others.

use keel_core::{decide_seed, Action, Catalog, ChangeScript, HistoryRecord, HistoryTable};
use keel_core::{RunMode, RunSummary};
use keel_db::Database;
use std::time::Instant;

use crate::client::ScriptClient;
use crate::error::{RunnerError, RunnerResult};
use crate::outcome::{RunReport, ScriptOutcome};

/// Applies seed scripts through an external client
pub struct SeedRunner<'a> {
    db: &'a dyn Database,
    table: HistoryTable,
    client: &'a dyn ScriptClient,
}

impl<'a> SeedRunner<'a> {
    pub fn new(db: &'a dyn Database, table: HistoryTable, client: &'a dyn ScriptClient) -> Self {
        Self { db, table, client }
    }

    /// Run every new, failed, or changed seed
    pub async fn run<F>(&self, catalog: &Catalog, mut on_outcome: F) -> RunnerResult<RunReport>
    where
        F: FnMut(&ScriptOutcome),
    {
        let start = Instant::now();
        self.db.ensure_history_table(&self.table).await?;
        let history = self.db.fetch_history(&self.table).await?;
        let mut report = RunReport::new(RunSummary::new(RunMode::Seed, false, catalog.len()));

        for script in catalog {
            let action = decide_seed(script, history.get(&script.filename));
            log::debug!("{}: {}", script.filename, action);

            let outcome = if action.executes() {
                self.execute(script, action).await?
            } else {
                ScriptOutcome::decided(&script.filename, action)
            };

            on_outcome(&outcome);
            report.push(outcome);
        }

        report.summary.finish(start.elapsed().as_millis() as u64);
        Ok(report)
    }

    async fn execute(&self, script: &ChangeScript, action: Action) -> RunnerResult<ScriptOutcome> {
        self.db
            .upsert_history(&self.table, &HistoryRecord::tentative(script))
            .await?;

        // The client opens the database itself
        if let Err(e) = self.db.disconnect().await {
            log::warn!("Failed to release connection before {}: {}", script.filename, e);
        }

        let start = Instant::now();
        let result = self.client.run_script(script).await;
        let elapsed_ms = start.elapsed().as_millis() as i64;

        let mut outcome = ScriptOutcome::decided(&script.filename, action);
        outcome.execution_time_ms = Some(elapsed_ms);

        match result {
            Ok(()) => {
                self.db
                    .upsert_history(&self.table, &HistoryRecord::succeeded(script, elapsed_ms))
                    .await?;
                log::debug!(
                    "{} seeded via {} in {}ms",
                    script.filename,
                    self.client.name(),
                    elapsed_ms
                );
            }
            Err(e) => {
                let message = e.to_string();
                self.record_failure(script, elapsed_ms, &message).await?;
                log::warn!("Seed {} failed: {}", script.filename, message);
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
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
