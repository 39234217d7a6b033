//! Check command implementation
//!
//! Read-only. Exits 0 when every migration is up to date, 1 when some are
//! pending, 2 when any applied migration has changed, and 3 when the check
//! itself could not run.

use anyhow::{Context, Result};
use keel_core::status::{EXIT_CLEAN, EXIT_ERROR};
use keel_core::{Catalog, CheckReport, ScriptState};
use keel_runner::MigrationRunner;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{self, ExitCode};

/// Execute the check command
pub async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let code = match check(args, global).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            EXIT_ERROR
        }
    };

    if code != EXIT_CLEAN {
        return Err(ExitCode(code).into());
    }
    Ok(())
}

async fn check(args: &CheckArgs, global: &GlobalArgs) -> Result<i32> {
    let project = common::load_project(global)?;
    let table = project.config.migrations_history_table()?;
    let catalog = Catalog::load(&project.migrations_dir()).context("Failed to load migrations")?;
    let db = common::connect(global)?;

    let result = MigrationRunner::new(&db, table).check(&catalog).await;
    common::close(&db).await;
    let report = result.context("Failed to read migration history")?;

    if !args.quiet {
        print_entries(&report);
    }
    println!(
        "{} up to date, {} pending, {} divergent",
        report.count(ScriptState::UpToDate),
        report.count(ScriptState::Pending),
        report.count(ScriptState::Divergent)
    );

    Ok(report.exit_code())
}

fn print_entries(report: &CheckReport) {
    for (filename, state) in &report.entries {
        let marker = match state {
            ScriptState::UpToDate => "✓",
            ScriptState::Pending => "-",
            ScriptState::Divergent => "!",
        };
        println!("  {} {} ({})", marker, filename, state);
    }
    if !report.entries.is_empty() {
        println!();
    }
}
