//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use keel_core::{Action, Config, RunSummary};
use keel_db::{DatabaseCore, DuckDbBackend};
use keel_runner::ScriptOutcome;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main maps it to the process status
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Configuration plus the directory it is relative to
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    pub fn seeds_dir(&self) -> PathBuf {
        self.config.seeds_path_absolute(&self.root)
    }

    pub fn target_dir(&self) -> PathBuf {
        self.config.target_path_absolute(&self.root)
    }
}

/// Load `keel.yml` (or the `--config` override) for the project directory
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let loaded = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    };
    let config = loaded.context("Failed to load configuration")?;

    if global.verbose {
        eprintln!(
            "[verbose] Project {}: migrations={}, seeds={}, history schema={}",
            root.display(),
            config.migrations_path,
            config.seeds_path,
            config.history_schema
        );
    }
    Ok(Project { root, config })
}

/// Open the database named by the environment
pub(crate) fn connect(global: &GlobalArgs) -> Result<DuckDbBackend> {
    let url = Config::resolve_database_url()?;
    if global.verbose {
        eprintln!("[verbose] Connecting to {}", url);
    }
    DuckDbBackend::new(&url).context("Failed to connect to database")
}

/// Release the connection; failures here never change the exit status
pub(crate) async fn close(db: &DuckDbBackend) {
    if let Err(e) = db.disconnect().await {
        log::warn!("Failed to close database connection: {}", e);
    }
}

/// Write a run summary for external automation
pub(crate) fn write_summary(path: &Path, summary: &RunSummary, global: &GlobalArgs) -> Result<()> {
    summary
        .save(path)
        .with_context(|| format!("Failed to write run summary: {}", path.display()))?;
    if global.verbose {
        eprintln!("[verbose] Run summary written to {}", path.display());
    }
    Ok(())
}

/// Print one decision line as soon as it is made
pub(crate) fn print_outcome(outcome: &ScriptOutcome) {
    let timing = outcome
        .execution_time_ms
        .map(|ms| format!(" ({}ms)", ms))
        .unwrap_or_default();

    if let Some(err) = &outcome.error {
        println!("  ✗ {} [{}] - {}", outcome.filename, outcome.action, err);
        return;
    }

    match outcome.action {
        Action::Skip => println!("  - {} (up to date)", outcome.filename),
        Action::Blocked => println!(
            "  ! {} changed since it was applied (blocked, use --force to re-apply)",
            outcome.filename
        ),
        Action::Baselined => println!("  ✓ {} (baselined)", outcome.filename),
        Action::Apply => println!("  ✓ {}{}", outcome.filename, timing),
        action => println!("  ✓ {} [{}]{}", outcome.filename, action, timing),
    }
}
