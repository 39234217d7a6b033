//! Configuration types and parsing for keel.yml

use crate::error::{CoreError, CoreResult};
use crate::history::HistoryTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "keel.yml";

/// Primary environment variable holding the connection string
pub const DATABASE_URL_ENV: &str = "KEEL_DATABASE_URL";

/// Fallback environment variable holding the connection string
pub const DATABASE_URL_FALLBACK_ENV: &str = "DATABASE_URL";

/// Project configuration from keel.yml
///
/// Every field has a default, so a project without a config file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding migration scripts
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Directory holding seed scripts
    #[serde(default = "default_seeds_path")]
    pub seeds_path: String,

    /// Output directory for run summaries
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Schema that owns both history tables
    #[serde(default = "default_history_schema")]
    pub history_schema: String,

    /// History table for migrations
    #[serde(default = "default_migrations_table")]
    pub migrations_table: String,

    /// History table for seeds
    #[serde(default = "default_seeds_table")]
    pub seeds_table: String,

    /// External SQL client used to run seeds
    #[serde(default = "default_seed_client")]
    pub seed_client: String,
}

fn default_migrations_path() -> String {
    "db/migrations".to_string()
}

fn default_seeds_path() -> String {
    "db/seeds".to_string()
}

fn default_target_path() -> String {
    "target".to_string()
}

fn default_history_schema() -> String {
    "keel".to_string()
}

fn default_migrations_table() -> String {
    "schema_migrations".to_string()
}

fn default_seeds_table() -> String {
    "seed_history".to_string()
}

fn default_seed_client() -> String {
    "duckdb".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_path: default_migrations_path(),
            seeds_path: default_seeds_path(),
            target_path: default_target_path(),
            history_schema: default_history_schema(),
            migrations_table: default_migrations_table(),
            seeds_table: default_seeds_table(),
            seed_client: default_seed_client(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `keel.yml` from a project directory, falling back to defaults
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    /// Validate identifiers and paths
    pub fn validate(&self) -> CoreResult<()> {
        self.migrations_history_table()?;
        self.seeds_history_table()?;

        if self.migrations_table == self.seeds_table {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrations_table and seeds_table must differ (both are '{}')",
                    self.migrations_table
                ),
            });
        }

        if self.seed_client.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "seed_client must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// History table for migrations
    pub fn migrations_history_table(&self) -> CoreResult<HistoryTable> {
        HistoryTable::new(&self.history_schema, &self.migrations_table)
    }

    /// History table for seeds
    pub fn seeds_history_table(&self) -> CoreResult<HistoryTable> {
        HistoryTable::new(&self.history_schema, &self.seeds_table)
    }

    /// Get absolute migrations directory relative to a project root
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Get absolute seeds directory relative to a project root
    pub fn seeds_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.seeds_path)
    }

    /// Get absolute target path relative to a project root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }

    /// Resolve the connection string from the environment.
    ///
    /// `KEEL_DATABASE_URL` wins over `DATABASE_URL`; empty values count as unset.
    pub fn resolve_database_url() -> CoreResult<String> {
        [DATABASE_URL_ENV, DATABASE_URL_FALLBACK_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or(CoreError::DatabaseUrlMissing {
                primary: DATABASE_URL_ENV,
                fallback: DATABASE_URL_FALLBACK_ENV,
            })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
