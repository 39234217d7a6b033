//! Keel CLI - versioned SQL migrations and seeds with drift detection

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, migrate, seed};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return std::process::ExitCode::from(cli::usage_exit_code(&err) as u8);
        }
    };

    let _logger = match init_logging(cli.global.verbose) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {:#}", e);
            return std::process::ExitCode::from(1);
        }
    };

    let result = match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
        cli::Commands::Check(args) => check::execute(args, &cli.global).await,
        cli::Commands::Seed(args) => seed::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::ExitCode::from(code.0 as u8),
            None => {
                log::debug!("{:?}", err);
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::from(1)
            }
        },
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked from `--verbose`
fn init_logging(verbose: bool) -> Result<flexi_logger::LoggerHandle> {
    let level = if verbose { "debug" } else { "info" };
    let handle = flexi_logger::Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .start()?;
    Ok(handle)
}
