//! CLI argument definitions using clap derive API

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use keel_core::status::EXIT_ERROR;

/// Keel - versioned SQL migrations and seeds with drift detection
#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Migrate(MigrateArgs),

    /// Compare migrations with history (exit 0 clean, 1 pending, 2 divergent, 3 error)
    Check(CheckArgs),

    /// Apply new or changed seed scripts through the external SQL client
    Seed(SeedArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Report applied, failed, and pending migrations without changing anything
    #[arg(long, conflicts_with_all = ["force", "baseline"])]
    pub status: bool,

    /// Re-apply migrations whose content changed since they were applied
    #[arg(long, conflicts_with = "baseline")]
    pub force: bool,

    /// Record every migration as applied without executing it
    #[arg(long)]
    pub baseline: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Print only the summary line (exit codes are unchanged)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the seed command
#[derive(Args, Debug, Default)]
pub struct SeedArgs {
    /// Override the `seed_client` config key for this run
    #[arg(long)]
    pub client: Option<String>,
}

/// Process status for a failed argument parse.
///
/// Help and version requests succeed. Every usage error exits with the
/// checker's operational-error code, so a mistyped flag is never read as
/// divergence (clap's own default is 2).
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
