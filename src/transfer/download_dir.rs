//! The configured download root.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Single configured download directory with a known default.
///
/// Many operations read the path; only
/// [`TransferManager::ensure_download_directory`](super::TransferManager::ensure_download_directory),
/// [`TransferManager::change_download_dir`](super::TransferManager::change_download_dir)
/// and the reset coordinator write it. Readers racing a writer may observe
/// either value.
#[derive(Debug)]
pub struct DownloadDirectory {
    current: RwLock<Option<PathBuf>>,
    default_location: PathBuf,
}

impl DownloadDirectory {
    /// Create a directory slot with an optional configured path.
    pub fn new(configured: Option<PathBuf>, default_location: impl Into<PathBuf>) -> Self {
        Self {
            current: RwLock::new(configured),
            default_location: default_location.into(),
        }
    }

    /// The configured path, if any.
    #[must_use]
    pub fn get(&self) -> Option<PathBuf> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether a path is configured.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Configure `path`.
    pub fn set(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!("Download directory set to {}", path.display());
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(path);
    }

    /// Forget the configured path.
    pub fn clear(&self) {
        debug!("Download directory cleared");
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Where the directory lives when nothing else is configured.
    #[must_use]
    pub fn default_location(&self) -> &Path {
        &self.default_location
    }
}
