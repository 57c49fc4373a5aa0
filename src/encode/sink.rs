//! Where finished exports go.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{LayrError, LayrResult};

/// Outcome of a save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedExport {
    pub file_name: String,
    pub bytes: usize,
    /// Set when the sink wrote to disk.
    pub path: Option<PathBuf>,
}

/// User-facing save action for encoded exports.
pub trait ExportSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> LayrResult<SavedExport>;
}

/// Keeps every saved file in memory, in save order.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub saved: Vec<(String, Vec<u8>)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&(String, Vec<u8>)> {
        self.saved.last()
    }
}

impl ExportSink for InMemorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> LayrResult<SavedExport> {
        self.saved.push((file_name.to_owned(), bytes.to_vec()));
        Ok(SavedExport {
            file_name: file_name.to_owned(),
            bytes: bytes.len(),
            path: None,
        })
    }
}

/// Writes exports into a directory, replacing files with the same name.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> LayrResult<SavedExport> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(LayrError::validation(format!(
                "export file name '{file_name}' must be a plain file name"
            )));
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        let path = self.dir.join(file_name);
        // Write to a sibling temp file first so a failed write never leaves a truncated export.
        let tmp = self.dir.join(format!(".{file_name}.partial"));
        if let Err(err) = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, &path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(SavedExport {
            file_name: file_name.to_owned(),
            bytes: bytes.len(),
            path: Some(path),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
