//! Local filesystem snapshot storage.
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! killed run leaves either the old snapshot or the new one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// Snapshot stored as a newline-delimited file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load(&self) -> Result<Option<Snapshot>> {
        let Some(bytes) = self
            .read_bytes()
            .await
            .map_err(|e| AppError::persistence(&self.path, e))?
        else {
            log::info!("No snapshot at {} (first run)", self.path.display());
            return Ok(None);
        };

        let text = String::from_utf8(bytes)
            .map_err(|e| AppError::persistence(&self.path, format!("not UTF-8: {e}")))?;
        let snapshot = Snapshot::from_lines(&text);
        log::debug!(
            "Loaded {} fingerprints from {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.write_bytes(snapshot.to_lines().as_bytes())
            .await
            .map_err(|e| AppError::persistence(&self.path, e))?;
        log::info!(
            "Snapshot: {} fingerprints written to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
