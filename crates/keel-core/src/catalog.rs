//! Script catalog: discovery of versioned `.sql` change-scripts
//!
//! A catalog is the sorted list of every `.sql` file sitting directly in one
//! directory. Filenames are the identity of a script and define execution
//! order through plain byte-wise sorting, so authors encode ordering in the
//! name (`001_init.sql`, `20240105_add_col.sql`, ...).

use crate::checksum::{compute_checksum, compute_checksum_bytes};
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// One versioned unit of SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeScript {
    /// File name, the stable identity and sort key
    pub filename: String,

    /// Absolute or project-relative path the script was read from
    pub path: PathBuf,

    /// Script text; invalid UTF-8 sequences are replaced when read from disk
    pub content: String,

    /// SHA-256 of the file bytes, derived on every load and never stored on disk
    pub fingerprint: String,
}

impl ChangeScript {
    /// Build a script from in-memory content
    pub fn new(filename: impl Into<String>, path: PathBuf, content: impl Into<String>) -> Self {
        let content = content.into();
        let fingerprint = compute_checksum(&content);
        Self {
            filename: filename.into(),
            path,
            content,
            fingerprint,
        }
    }

    /// Build a script from raw file bytes.
    ///
    /// The fingerprint covers the bytes as stored, so a non-UTF-8 script still
    /// loads and any byte-level edit is detected.
    pub fn from_bytes(filename: impl Into<String>, path: PathBuf, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            path,
            content: String::from_utf8_lossy(bytes).into_owned(),
            fingerprint: compute_checksum_bytes(bytes),
        }
    }

    /// Read a script from disk
    pub fn from_file(path: PathBuf) -> CoreResult<Self> {
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!("Script file name is not valid UTF-8: {}", path.display()),
            })?
            .to_string();
        let bytes = std::fs::read(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::from_bytes(filename, path, &bytes))
    }
}

/// Ordered collection of change-scripts from one directory
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Directory the scripts were discovered in
    pub dir: PathBuf,

    /// Scripts sorted ascending by filename
    pub scripts: Vec<ChangeScript>,
}

impl Catalog {
    /// Load every `.sql` file in `dir`.
    ///
    /// A missing directory is an error; no partial catalog is returned.
    pub fn load(dir: &Path) -> CoreResult<Self> {
        Self::load_optional(dir)?.ok_or_else(|| CoreError::ScriptDirNotFound {
            path: dir.display().to_string(),
        })
    }

    /// Like [`Catalog::load`], but returns `Ok(None)` when `dir` does not exist.
    pub fn load_optional(dir: &Path) -> CoreResult<Option<Self>> {
        if !dir.is_dir() {
            return Ok(None);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut scripts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "sql") {
                scripts.push(ChangeScript::from_file(path)?);
            }
        }

        // Byte-wise ordering; String's Ord compares the UTF-8 bytes
        scripts.sort_by(|a, b| a.filename.cmp(&b.filename));
        log::debug!("Catalog {}: {} scripts", dir.display(), scripts.len());

        Ok(Some(Self {
            dir: dir.to_path_buf(),
            scripts,
        }))
    }

    /// Build a catalog directly from scripts, sorting them by filename
    pub fn from_scripts(dir: PathBuf, mut scripts: Vec<ChangeScript>) -> Self {
        scripts.sort_by(|a, b| a.filename.cmp(&b.filename));
        Self { dir, scripts }
    }

    /// Number of scripts
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// True when the directory held no scripts
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Iterate over scripts in execution order
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeScript> {
        self.scripts.iter()
    }

    /// Look up a script by filename
    pub fn get(&self, filename: &str) -> Option<&ChangeScript> {
        self.scripts.iter().find(|s| s.filename == filename)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ChangeScript;
    type IntoIter = std::slice::Iter<'a, ChangeScript>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.iter()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
