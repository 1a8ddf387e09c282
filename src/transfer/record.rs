//! Transfer records and status transitions.
//!
//! A [`TransferRecord`] tracks one file download keyed by its source URL.
//! Status promotion to [`TransferStatus::Downloaded`] is computed by the pure
//! function [`resolve_status`] from the byte counters, never trusted from
//! the reporting engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Lifecycle status of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Bytes are still arriving.
    Downloading,
    /// All bytes arrived (`current_size >= total_size > 0`).
    Downloaded,
    /// The engine or the open handler failed.
    Error,
    /// The file was discovered missing on disk.
    NotFound,
}

impl TransferStatus {
    /// Terminal statuses expect no further progress without user action.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Downloading)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Downloading => "DOWNLOADING",
            Self::Downloaded => "DOWNLOADED",
            Self::Error => "ERROR",
            Self::NotFound => "NOT_FOUND",
        };
        f.write_str(label)
    }
}

/// Compute the status a progress report should leave a record in.
///
/// A report whose counters say the transfer is complete is promoted to
/// `Downloaded` whatever status the caller supplied. Every other report keeps
/// the caller's status.
///
/// # Examples
///
/// ```rust
/// use xfer_cli::transfer::{TransferStatus, resolve_status};
///
/// assert_eq!(resolve_status(50, 100, TransferStatus::Downloading), TransferStatus::Downloading);
/// assert_eq!(resolve_status(100, 100, TransferStatus::Downloading), TransferStatus::Downloaded);
/// // An unknown total never completes a transfer.
/// assert_eq!(resolve_status(0, 0, TransferStatus::Downloading), TransferStatus::Downloading);
/// ```
#[must_use]
pub const fn resolve_status(
    current_size: u64,
    total_size: u64,
    reported: TransferStatus,
) -> TransferStatus {
    if total_size > 0 && current_size >= total_size {
        TransferStatus::Downloaded
    } else {
        reported
    }
}

/// One tracked file download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Source URL; the unique key of the record.
    pub url: String,
    /// Destination path. Empty until the engine has resolved it.
    #[serde(default)]
    pub local_path: PathBuf,
    /// MIME type reported by the server. Gates the "open" action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Current lifecycle status.
    pub status: TransferStatus,
    /// Bytes received so far.
    #[serde(default)]
    pub current_size: u64,
    /// Expected size in bytes, zero when unknown.
    #[serde(default)]
    pub total_size: u64,
    /// Creation time; the sort key of listings.
    pub download_time: DateTime<Utc>,
}

impl TransferRecord {
    /// Create a record in `Downloading` status stamped with the current time.
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
            mime_type: None,
            status: TransferStatus::Downloading,
            current_size: 0,
            total_size: 0,
            download_time: Utc::now(),
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: TransferStatus) -> Self {
        self.status = status;
        self
    }

    /// Set both byte counters.
    #[must_use]
    pub fn with_sizes(mut self, current_size: u64, total_size: u64) -> Self {
        self.current_size = current_size;
        self.total_size = total_size;
        self
    }

    /// Set the creation time.
    #[must_use]
    pub fn with_download_time(mut self, download_time: DateTime<Utc>) -> Self {
        self.download_time = download_time;
        self
    }

    /// Apply a progress report.
    ///
    /// Reports against a record that already reached `Downloaded` are ignored:
    /// a completed transfer never reverts on its own.
    ///
    /// Returns `true` if the record changed.
    pub fn apply_progress(
        &mut self,
        current_size: u64,
        total_size: u64,
        reported: TransferStatus,
    ) -> bool {
        if self.status == TransferStatus::Downloaded {
            return false;
        }
        self.current_size = current_size;
        self.total_size = total_size;
        self.status = resolve_status(current_size, total_size, reported);
        true
    }

    /// The folder containing the file, if `local_path` is set.
    #[must_use]
    pub fn folder(&self) -> Option<&Path> {
        if self.local_path.as_os_str().is_empty() {
            return None;
        }
        self.local_path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// The file name portion of `local_path`, for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.url.clone())
    }
}
