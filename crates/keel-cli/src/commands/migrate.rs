//! Migrate command implementation
//!
//! Default mode applies pending migrations in filename order and halts at the
//! first failure. `--status` only reads history, `--baseline` records every
//! migration as applied without running it.

use anyhow::{Context, Result};
use keel_core::{Action, Catalog, RunOutcome, StatusClass};
use keel_runner::{MigrationRunner, RunReport};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{self, ExitCode, Project};

/// Summary file name under the target directory
pub(crate) const SUMMARY_FILE: &str = "migration_summary.json";

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let table = project.config.migrations_history_table()?;
    let catalog = Catalog::load(&project.migrations_dir()).context("Failed to load migrations")?;
    let db = common::connect(global)?;

    if global.verbose {
        eprintln!(
            "[verbose] {} migrations in {}, history table {}",
            catalog.len(),
            catalog.dir.display(),
            table
        );
    }

    let runner = MigrationRunner::new(&db, table);
    let result = if args.status {
        status(&runner, &catalog).await
    } else {
        apply(&runner, &catalog, args, &project, global).await
    };

    common::close(&db).await;
    result
}

async fn status(runner: &MigrationRunner<'_>, catalog: &Catalog) -> Result<()> {
    let entries = runner
        .status(catalog)
        .await
        .context("Failed to read migration history")?;

    if entries.is_empty() {
        println!("No migrations found in {}", catalog.dir.display());
        return Ok(());
    }

    for entry in &entries {
        match entry.class {
            StatusClass::Applied if entry.modified => {
                println!("  applied  {} (modified since applied)", entry.filename)
            }
            StatusClass::Applied => println!("  applied  {}", entry.filename),
            StatusClass::Error => println!(
                "  error    {} - {}",
                entry.filename,
                entry
                    .error_message
                    .as_deref()
                    .unwrap_or("interrupted before completion")
            ),
            StatusClass::Pending => println!("  pending  {}", entry.filename),
        }
    }

    let count = |class: StatusClass| entries.iter().filter(|e| e.class == class).count();
    println!();
    println!(
        "{} applied, {} error, {} pending",
        count(StatusClass::Applied),
        count(StatusClass::Error),
        count(StatusClass::Pending)
    );
    Ok(())
}

async fn apply(
    runner: &MigrationRunner<'_>,
    catalog: &Catalog,
    args: &MigrateArgs,
    project: &Project,
    global: &GlobalArgs,
) -> Result<()> {
    if catalog.is_empty() {
        println!("No migrations found in {}", catalog.dir.display());
    } else if args.baseline {
        println!("Baselining {} migrations...\n", catalog.len());
    } else {
        println!("Applying {} migrations...\n", catalog.len());
    }

    let result = if args.baseline {
        runner.baseline(catalog, common::print_outcome).await
    } else {
        runner
            .apply(catalog, args.force, common::print_outcome)
            .await
    };
    let report = result.context("Migration run aborted")?;

    let summary_path = project.target_dir().join(SUMMARY_FILE);
    common::write_summary(&summary_path, &report.summary, global)?;

    print_totals(&report);

    if report.summary.outcome == RunOutcome::Failed {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_totals(report: &RunReport) {
    let summary = &report.summary;
    println!();
    println!(
        "Applied {}, skipped {}, blocked {}, failed {} ({}ms)",
        summary.applied,
        summary.skipped,
        report.with_action(Action::Blocked).count(),
        summary.failed,
        summary.elapsed_ms
    );

    if report.halted {
        println!(
            "Stopped at the first failure; {} migration(s) not attempted",
            summary.not_attempted
        );
    }
    if summary.outcome == RunOutcome::Divergent {
        println!("Some applied migrations have changed; re-run with --force to re-apply them");
    }
}
