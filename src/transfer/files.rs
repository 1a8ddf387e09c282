//! Filesystem collaborator used by the transfer manager.
//!
//! The manager never touches `std::fs` directly; it goes through
//! [`FileSystem`] so deletion and open flows can be exercised against an
//! in-memory implementation in tests.

use crate::core::XferError;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Existence checks, removal and directory creation.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether `path` exists (file or directory).
    async fn exists(&self, path: &Path) -> bool;

    /// Remove the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`XferError::NotFound`] if the file is already gone
    /// - [`XferError::InUse`] if another process holds the file
    /// - [`XferError::Io`] for anything else
    async fn remove(&self, path: &Path) -> Result<(), XferError>;

    /// Create `path` and any missing parents.
    async fn mkdir(&self, path: &Path) -> Result<(), XferError>;
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove(&self, path: &Path) -> Result<(), XferError> {
        debug!("Removing {}", path.display());
        fs::remove_file(path).await.map_err(|e| XferError::from_remove(path.display().to_string(), e))
    }

    async fn mkdir(&self, path: &Path) -> Result<(), XferError> {
        debug!("Creating directory {}", path.display());
        fs::create_dir_all(path).await?;
        Ok(())
    }
}
