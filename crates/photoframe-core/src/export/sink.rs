//! Export destinations.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors from saving an exported file.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Save rejected: {0}")]
    Rejected(String),
}

/// Where a saved export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedExport {
    /// A path, URL or other destination description.
    pub location: String,
}

/// The save side effect at the end of the export pipeline.
#[allow(async_fn_in_trait)]
pub trait ExportSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<SavedExport, SinkError>;
}

/// Reject names that would escape the destination.
pub fn check_filename(filename: &str) -> Result<(), SinkError> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.chars().any(|c| matches!(c, '/' | '\\' | '\0'))
    {
        return Err(SinkError::Rejected(format!("invalid filename {filename:?}")));
    }
    Ok(())
}

/// Writes exports into a directory, creating it if needed.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySink {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ExportSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<SavedExport, SinkError> {
        check_filename(filename)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes).await?;

        Ok(SavedExport {
            location: path.display().to_string(),
        })
    }
}

/// Keeps exports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All saved `(filename, bytes)` pairs, oldest first.
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExportSink for MemorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<SavedExport, SinkError> {
        check_filename(filename)?;
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((filename.to_string(), bytes.to_vec()));
        Ok(SavedExport {
            location: format!("memory:{filename}"),
        })
    }
}
