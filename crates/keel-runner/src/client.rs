//! External SQL client used to run seed scripts
//!
//! Seeds may use client-side directives that are not valid as one prepared
//! batch, so they go through the database's own command-line client. Success
//! is judged only by the client's exit status.

use async_trait::async_trait;
use keel_core::ChangeScript;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{RunnerError, RunnerResult};

/// Runs one script outside the in-process connection
#[async_trait]
pub trait ScriptClient: Send + Sync {
    /// Run `script` to completion; `Err` when the client reports failure
    async fn run_script(&self, script: &ChangeScript) -> RunnerResult<()>;

    /// Client name for logging
    fn name(&self) -> &str;
}

/// The `duckdb` command-line shell
///
/// Runs `duckdb -bail <database>` with the script file on stdin, so the shell
/// stops at the first failing statement and exits non-zero.
#[derive(Debug, Clone)]
pub struct DuckDbCli {
    program: PathBuf,
    database: PathBuf,
}

impl DuckDbCli {
    /// Locate `program` on `PATH` and bind it to a database file
    pub fn resolve(program: &str, database: Option<&Path>) -> RunnerResult<Self> {
        let program_path = find_executable(program).ok_or_else(|| RunnerError::ClientNotFound {
            program: program.to_string(),
        })?;
        let database = database.ok_or_else(|| {
            RunnerError::ClientConfig(
                "seeds need a file-backed database; an in-memory database is private to this process"
                    .to_string(),
            )
        })?;
        log::debug!("Seed client: {}", program_path.display());
        Ok(Self {
            program: program_path,
            database: database.to_path_buf(),
        })
    }

    /// Resolved client executable
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl ScriptClient for DuckDbCli {
    async fn run_script(&self, script: &ChangeScript) -> RunnerResult<()> {
        let program = self.program.display().to_string();
        let input = std::fs::File::open(&script.path).map_err(|e| RunnerError::ClientSpawn {
            program: program.clone(),
            source: e,
        })?;

        let output = Command::new(&self.program)
            .arg("-bail")
            .arg(&self.database)
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RunnerError::ClientSpawn { program, source: e })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RunnerError::ClientFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("duckdb")
    }
}

/// Find an executable by name on `PATH`, or check an explicit path.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        executable_names(program)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|p| is_executable(p))
    })
}

#[cfg(windows)]
fn executable_names(program: &str) -> Vec<String> {
    vec![format!("{program}.exe"), program.to_string()]
}

#[cfg(not(windows))]
fn executable_names(program: &str) -> Vec<String> {
    vec![program.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
