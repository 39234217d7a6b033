//! Seed command implementation

use anyhow::{Context, Result};
use keel_core::Catalog;
use keel_runner::{find_executable, DuckDbCli, RunnerError, SeedRunner};

use crate::cli::{GlobalArgs, SeedArgs};
use crate::commands::common::{self, ExitCode};

/// Summary file name under the target directory
pub(crate) const SUMMARY_FILE: &str = "seed_summary.json";

/// Execute the seed command
pub async fn execute(args: &SeedArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let table = project.config.seeds_history_table()?;

    let seeds_dir = project.seeds_dir();
    let Some(catalog) = Catalog::load_optional(&seeds_dir).context("Failed to load seeds")? else {
        println!("No seeds directory at {}, nothing to do.", seeds_dir.display());
        return Ok(());
    };
    if catalog.is_empty() {
        println!("No seed files found in {}.", seeds_dir.display());
        return Ok(());
    }

    let program = args
        .client
        .as_deref()
        .unwrap_or(project.config.seed_client.as_str());
    if find_executable(program).is_none() {
        return Err(RunnerError::ClientNotFound {
            program: program.to_string(),
        }
        .into());
    }

    let db = common::connect(global)?;
    let client = match DuckDbCli::resolve(program, db.path()) {
        Ok(client) => client,
        Err(e) => {
            common::close(&db).await;
            return Err(e.into());
        }
    };

    if global.verbose {
        eprintln!(
            "[verbose] Running {} seeds with {}",
            catalog.len(),
            client.program().display()
        );
    }

    println!("Seeding {} scripts...\n", catalog.len());

    let result = SeedRunner::new(&db, table, &client)
        .run(&catalog, common::print_outcome)
        .await;
    common::close(&db).await;
    let report = result.context("Seed run aborted")?;

    let summary_path = project.target_dir().join(SUMMARY_FILE);
    common::write_summary(&summary_path, &report.summary, global)?;

    let summary = &report.summary;
    println!();
    println!(
        "Seeded {}, skipped {}, failed {} ({}ms)",
        summary.applied, summary.skipped, summary.failed, summary.elapsed_ms
    );

    if report.failure_count() > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
