//! keel-core - Core library for Keel
//!
//! This crate provides the change-script catalog, content fingerprints,
//! history records, the skip/apply/divergence decision rules, the status
//! reporter, run summaries, and configuration shared by every Keel component.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod decision;
pub mod error;
pub mod history;
pub mod status;
pub mod summary;

pub use catalog::{Catalog, ChangeScript};
pub use checksum::{compute_checksum, compute_checksum_bytes};
pub use config::Config;
pub use decision::{decide_migration, decide_seed, Action};
pub use error::{CoreError, CoreResult};
pub use history::{HistoryRecord, HistorySnapshot, HistoryTable};
pub use status::{classify, status_of, CheckReport, ScriptState, StatusClass, StatusEntry};
pub use summary::{RunMode, RunOutcome, RunSummary, ScriptTiming};
