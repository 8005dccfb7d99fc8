use std::path::PathBuf;

use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::ApiError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("download failed: {0}")]
    Download(#[from] ApiError),
    #[error("could not save export: {0}")]
    Persist(#[from] PersistError),
    #[error("empty export file name")]
    EmptyName,
}

/// Saves downloaded report exports into one directory.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(&self, file_name: &str, content: &[u8]) -> Result<PathBuf, ExportError> {
        // Keep only the final component so a file name cannot escape the directory.
        let name = file_name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
        if name.is_empty() || name == "." || name == ".." {
            return Err(ExportError::EmptyName);
        }
        let path = AtomicFileWriter::new(self.dir.clone()).write(name, content)?;
        Ok(path)
    }
}
