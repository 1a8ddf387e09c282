//! The update transport seam.
//!
//! An [`UpdateTransport`] knows where releases live. The controller asks it
//! for the latest [`ReleaseDescriptor`], consumes its download as a stream of
//! [`DownloadEvent`]s, and finally asks it to install.

use crate::core::XferError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// A release newer than the running binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Semantic version without a leading `v`.
    pub version: String,
    /// Declared size of the binary asset, zero if unknown.
    pub content_length: u64,
    /// Where the binary asset is downloaded from.
    #[serde(default)]
    pub download_url: String,
    /// Where the `.sha256` sidecar is downloaded from, if the release has one.
    #[serde(default)]
    pub checksum_url: Option<String>,
}

impl ReleaseDescriptor {
    /// Descriptor carrying only a version and a length.
    pub fn new(version: impl Into<String>, content_length: u64) -> Self {
        Self {
            version: version.into(),
            content_length,
            download_url: String::new(),
            checksum_url: None,
        }
    }
}

/// One step of an update download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadEvent {
    /// The download began; carries the declared length.
    Started(u64),
    /// A chunk of this many bytes arrived.
    Progress(u64),
    /// All bytes arrived.
    Finished,
}

/// Stream of download events; an `Err` item aborts the download.
pub type DownloadStream = BoxStream<'static, Result<DownloadEvent, XferError>>;

/// Source of releases.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    /// The newest release, or `None` if the running version is current.
    ///
    /// # Errors
    ///
    /// [`XferError::TransportFailure`] for network failures and malformed
    /// release metadata.
    async fn check_latest(&self) -> Result<Option<ReleaseDescriptor>, XferError>;

    /// Start downloading `release`.
    async fn download(&self, release: &ReleaseDescriptor) -> Result<DownloadStream, XferError>;

    /// Install a fully downloaded `release`.
    ///
    /// # Errors
    ///
    /// [`XferError::InstallFailure`] if the binary could not be replaced.
    async fn install(&self, release: &ReleaseDescriptor) -> Result<(), XferError>;
}
