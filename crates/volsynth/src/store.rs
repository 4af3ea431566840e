//! Whole-document dataset persistence.
//!
//! A dataset is acquired whole, mutated in memory, and released by writing
//! it back. Writes go to a sibling temporary file that is renamed over the
//! target, so readers never observe a partially written document.

use crate::{Result, VolatilityError};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A JSON dataset loaded from disk.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    path: PathBuf,
    document: Value,
}

impl DatasetFile {
    /// Load the document at `path`.
    ///
    /// A missing file is reported as [`VolatilityError::MissingInput`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => VolatilityError::MissingInput(path.clone()),
            _ => VolatilityError::io(&path, e),
        })?;
        let document = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "dataset loaded");
        Ok(Self { path, document })
    }

    /// Load, apply `mutate`, and write back only if it succeeds.
    ///
    /// When `mutate` fails the file on disk is left as it was.
    pub fn update<T, F>(path: impl Into<PathBuf>, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Value) -> Result<T>,
    {
        let mut file = Self::open(path)?;
        let output = mutate(&mut file.document)?;
        file.commit()?;
        Ok(output)
    }

    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loaded document.
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Loaded document, for mutation.
    pub const fn document_mut(&mut self) -> &mut Value {
        &mut self.document
    }

    /// Write the document back, replacing the file atomically.
    pub fn commit(self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.document)?;
        let tmp = temporary_sibling(&self.path);

        let written = fs::write(&tmp, content)
            .map_err(|e| VolatilityError::io(&tmp, e))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(|e| VolatilityError::io(&self.path, e)));
        if written.is_err() {
            // A partial write or failed rename must not leave the sibling behind
            let _ = fs::remove_file(&tmp);
        }
        written?;

        debug!(path = %self.path.display(), "dataset written");
        Ok(())
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
