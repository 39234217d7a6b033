//! keel-runner - Migration and seed executors for Keel
//!
//! Both executors walk a catalog in filename order, compare each script with
//! its history record, and record every attempt before and after running it.
//! Migrations run in-process inside a transaction and halt the batch on the
//! first failure. Seeds run through an external SQL client and re-apply
//! automatically when their content changes.
//!
//! No lock is taken: two runners pointed at the same database race on the
//! history table. Callers must ensure a single active runner.

pub mod client;
pub mod error;
pub mod migrate;
pub mod outcome;
pub mod seed;

pub use client::{find_executable, DuckDbCli, ScriptClient};
pub use error::{RunnerError, RunnerResult};
pub use migrate::MigrationRunner;
pub use outcome::{RunReport, ScriptOutcome};
pub use seed::SeedRunner;
