//! User-driven operations on transfers: delete, open, reveal and download
//! directory management.
//!
//! Every public operation here is an error boundary. Filesystem and handler
//! failures are translated into status changes on the record plus a
//! [`Notice`]; the caller receives a typed outcome describing what happened
//! and never a propagated error.

use super::download_dir::DownloadDirectory;
use super::files::FileSystem;
use super::opener::{DirectoryPicker, Opener};
use super::record::{TransferRecord, TransferStatus};
use super::store::TransferStore;
use crate::constants::HIGH_RISK_EXTENSIONS;
use crate::platform::Platform;
use crate::surface::{Notice, NoticeKind, UserSurface};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of [`TransferManager::delete_transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record (and its file, if present) is gone.
    Removed,
    /// The file was missing; the record is kept and marked `NOT_FOUND`.
    MarkedNotFound,
    /// The file is locked by another process; nothing changed.
    InUse,
    /// No record exists for the URL.
    Unknown,
}

/// Result of [`TransferManager::open_transfer`] and
/// [`TransferManager::open_containing_folder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Nothing to open yet (no MIME type or still downloading).
    Ignored,
    /// The file was handed to its default handler.
    Opened(PathBuf),
    /// The containing folder was opened instead of the file.
    RevealedFolder(PathBuf),
    /// The file is gone; the record is now `NOT_FOUND`.
    Missing,
    /// The folder no longer exists; the record is unchanged.
    FolderMissing(PathBuf),
    /// The handler failed.
    Failed,
    /// No record exists for the URL.
    Unknown,
}

/// Whether `path` has an executable or script-like extension.
///
/// Matching is case-insensitive.
///
/// # Examples
///
/// ```rust
/// use xfer_cli::transfer::is_high_risk;
/// use std::path::Path;
///
/// assert!(is_high_risk(Path::new("setup.EXE")));
/// assert!(is_high_risk(Path::new("/tmp/run.bat")));
/// assert!(!is_high_risk(Path::new("report.pdf")));
/// assert!(!is_high_risk(Path::new("README")));
/// ```
#[must_use]
pub fn is_high_risk(path: &Path) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .is_some_and(|ext| HIGH_RISK_EXTENSIONS.contains(&ext.as_str()))
}

/// Orchestrates transfer operations against the store and collaborators.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use xfer_cli::platform::Platform;
/// use xfer_cli::surface::SilentSurface;
/// use xfer_cli::transfer::{
///     ArgPicker, DownloadDirectory, LocalFs, SystemOpener, TransferManager, TransferStore,
/// };
///
/// # async fn example() {
/// let manager = TransferManager::new(
///     Arc::new(TransferStore::new()),
///     Arc::new(DownloadDirectory::new(None, "/tmp/xfer/downloads")),
///     Arc::new(LocalFs),
///     Arc::new(SystemOpener),
///     Arc::new(ArgPicker::default()),
///     Arc::new(SilentSurface),
///     Platform::current(),
/// );
///
/// let outcome = manager.delete_transfer("https://example.com/file.zip", true).await;
/// println!("{outcome:?}");
/// # }
/// ```
pub struct TransferManager {
    store: Arc<TransferStore>,
    download_dir: Arc<DownloadDirectory>,
    fs: Arc<dyn FileSystem>,
    opener: Arc<dyn Opener>,
    picker: Arc<dyn DirectoryPicker>,
    surface: Arc<dyn UserSurface>,
    platform: Platform,
}

impl TransferManager {
    /// Wire a manager from its collaborators.
    pub fn new(
        store: Arc<TransferStore>,
        download_dir: Arc<DownloadDirectory>,
        fs: Arc<dyn FileSystem>,
        opener: Arc<dyn Opener>,
        picker: Arc<dyn DirectoryPicker>,
        surface: Arc<dyn UserSurface>,
        platform: Platform,
    ) -> Self {
        Self {
            store,
            download_dir,
            fs,
            opener,
            picker,
            surface,
            platform,
        }
    }

    /// The store this manager mutates.
    #[must_use]
    pub fn store(&self) -> &Arc<TransferStore> {
        &self.store
    }

    /// The download directory slot.
    #[must_use]
    pub fn download_dir(&self) -> &Arc<DownloadDirectory> {
        &self.download_dir
    }

    /// Delete a transfer and its file.
    ///
    /// - `NOT_FOUND` records are dropped without touching the filesystem.
    /// - With `verify_first`, a missing file marks the record `NOT_FOUND`
    ///   and keeps it so the user sees the discrepancy.
    /// - A locked file leaves the record untouched and raises a
    ///   "file in use" notice. The status is not set to `ERROR`.
    /// - If removal itself reports the file as already gone (possible when
    ///   verification was skipped), the record is dropped: the end state the
    ///   caller asked for has been reached.
    pub async fn delete_transfer(&self, url: &str, verify_first: bool) -> DeleteOutcome {
        let Some(record) = self.store.get(url) else {
            debug!("Delete requested for unknown transfer {url}");
            return DeleteOutcome::Unknown;
        };

        if record.status == TransferStatus::NotFound {
            self.store.remove(url);
            info!("Removed record for missing file {url}");
            return DeleteOutcome::Removed;
        }

        if verify_first && !self.fs.exists(&record.local_path).await {
            self.store.set_status(url, TransferStatus::NotFound);
            self.surface.notify(Notice::new(NoticeKind::FileMissing));
            warn!("File for {url} is missing at {}", record.local_path.display());
            return DeleteOutcome::MarkedNotFound;
        }

        match self.fs.remove(&record.local_path).await {
            Ok(()) => {
                self.store.remove(url);
                info!("Deleted {}", record.local_path.display());
                DeleteOutcome::Removed
            }
            Err(e) if e.is_not_found() => {
                self.store.remove(url);
                debug!("File for {url} was already gone");
                DeleteOutcome::Removed
            }
            Err(e) => {
                warn!("Failed to delete {}: {e}", record.local_path.display());
                self.surface.notify(Notice::new(NoticeKind::FileInUse));
                DeleteOutcome::InUse
            }
        }
    }

    /// Open a finished transfer.
    ///
    /// High-risk files (see [`is_high_risk`]) are never executed: their
    /// containing folder is opened instead.
    pub async fn open_transfer(&self, url: &str) -> OpenOutcome {
        let Some(record) = self.store.get(url) else {
            return OpenOutcome::Unknown;
        };

        if record.mime_type.is_none() || record.status == TransferStatus::Downloading {
            debug!("Nothing to open yet for {url}");
            return OpenOutcome::Ignored;
        }

        if record.local_path.as_os_str().is_empty() || !self.fs.exists(&record.local_path).await {
            self.store.set_status(url, TransferStatus::NotFound);
            self.surface.notify(Notice::new(NoticeKind::FileMissing));
            return OpenOutcome::Missing;
        }

        let (target, outcome) = if is_high_risk(&record.local_path) {
            match record.folder() {
                Some(folder) => {
                    info!("Revealing high-risk file {} instead of opening it", record.file_name());
                    (folder.to_path_buf(), OpenOutcome::RevealedFolder(folder.to_path_buf()))
                }
                None => {
                    self.mark_failed(url, NoticeKind::OpenFailed);
                    return OpenOutcome::Failed;
                }
            }
        } else {
            (record.local_path.clone(), OpenOutcome::Opened(record.local_path.clone()))
        };

        match self.opener.open(&target).await {
            Ok(()) => outcome,
            Err(e) => {
                warn!("Failed to open {}: {e}", target.display());
                self.mark_failed(url, NoticeKind::OpenFailed);
                OpenOutcome::Failed
            }
        }
    }

    /// Open the folder that contains a transfer's file.
    ///
    /// An empty `local_path` marks the record `NOT_FOUND`. A folder that no
    /// longer exists, or a file browser that fails, only raises a notice.
    pub async fn open_containing_folder(&self, url: &str) -> OpenOutcome {
        let Some(record) = self.store.get(url) else {
            return OpenOutcome::Unknown;
        };

        let Some(folder) = record.folder().map(Path::to_path_buf) else {
            self.store.set_status(url, TransferStatus::NotFound);
            self.surface.notify(Notice::new(NoticeKind::FileMissing));
            return OpenOutcome::Missing;
        };

        if !self.fs.exists(&folder).await {
            self.surface.notify(Notice::new(NoticeKind::FolderMissing));
            return OpenOutcome::FolderMissing(folder);
        }

        match self.opener.open(&folder).await {
            Ok(()) => OpenOutcome::RevealedFolder(folder),
            Err(e) => {
                warn!("Failed to open folder {}: {e}", folder.display());
                self.surface.notify(Notice::new(NoticeKind::OpenFolderFailed));
                OpenOutcome::Failed
            }
        }
    }

    /// Make sure the download directory is configured and present.
    ///
    /// Prompts for a directory when none is configured, recreates a
    /// configured directory that has disappeared, and returns whether the
    /// directory is usable afterwards.
    pub async fn ensure_download_directory(&self) -> bool {
        let Some(dir) = self.download_dir.get() else {
            debug!("No download directory configured, asking the user");
            return self.change_download_dir().await.is_some();
        };

        if self.fs.exists(&dir).await {
            return true;
        }

        match self.fs.mkdir(&dir).await {
            Ok(()) => {
                info!("Recreated download directory {}", dir.display());
                true
            }
            Err(e) => {
                warn!("Failed to create download directory {}: {e}", dir.display());
                self.surface.notify(Notice::new(NoticeKind::DownloadDirUnavailable));
                false
            }
        }
    }

    /// Ask the user for a new download directory.
    ///
    /// Platforms without a directory picker pick a file and use its parent.
    /// A path that does not exist is rejected. Returns the new directory.
    pub async fn change_download_dir(&self) -> Option<PathBuf> {
        let directory_mode = self.platform.supports_directory_picker();
        let picked = self.picker.pick(directory_mode).await?;

        let dir = if directory_mode {
            picked
        } else {
            picked.parent().map(Path::to_path_buf).unwrap_or(picked)
        };

        if dir.as_os_str().is_empty() || !self.fs.exists(&dir).await {
            self.surface.notify(Notice::new(NoticeKind::PathMissing));
            return None;
        }

        self.download_dir.set(dir.clone());
        self.surface.notify(Notice::new(NoticeKind::DownloadDirChanged));
        Some(dir)
    }

    /// Register a new transfer with the store.
    pub fn register(&self, record: TransferRecord) {
        self.store.register(record);
    }

    fn mark_failed(&self, url: &str, kind: NoticeKind) {
        self.store.set_status(url, TransferStatus::Error);
        self.surface.notify(Notice::new(kind));
    }
}
