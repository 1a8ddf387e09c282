//! HTTP download engine.
//!
//! [`HttpFetcher`] is the in-tree producer of progress events: it registers a
//! [`TransferRecord`] for the URL, streams the response body into the
//! download directory, and pushes a report through a [`ProgressReporter`] for
//! every chunk. It knows nothing about the store beyond registration.

use super::manager::TransferManager;
use super::progress::ProgressReporter;
use super::record::{TransferRecord, TransferStatus};
use crate::constants::{HTTP_READ_TIMEOUT, HTTP_TIMEOUT, USER_AGENT};
use crate::core::XferError;
use crate::utils::ProgressBar;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// File name used when a URL has no usable last path segment.
const FALLBACK_FILE_NAME: &str = "download";

/// Derive a file name from the last path segment of `url`.
///
/// Query strings and fragments are ignored.
///
/// # Examples
///
/// ```rust
/// use xfer_cli::transfer::file_name_from_url;
///
/// assert_eq!(file_name_from_url("https://example.com/files/report.pdf?x=1"), "report.pdf");
/// assert_eq!(file_name_from_url("https://example.com/"), "download");
/// ```
#[must_use]
pub fn file_name_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// Streams URLs into the download directory.
pub struct HttpFetcher {
    client: reqwest::Client,
    manager: Arc<TransferManager>,
    reporter: Arc<dyn ProgressReporter>,
    show_progress: bool,
}

impl HttpFetcher {
    /// Create a fetcher that registers records through `manager` and reports
    /// progress to `reporter`.
    ///
    /// # Errors
    ///
    /// Returns [`XferError::TransportFailure`] if the HTTP client cannot be
    /// built.
    pub fn new(
        manager: Arc<TransferManager>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Self, XferError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(HTTP_TIMEOUT)
            .read_timeout(HTTP_READ_TIMEOUT)
            .build()
            .map_err(|e| XferError::transport("client setup", e))?;
        Ok(Self {
            client,
            manager,
            reporter,
            show_progress: true,
        })
    }

    /// Enable or disable the terminal progress bar.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Download `url` into the download directory.
    ///
    /// The record is registered before the request is sent, so every failure
    /// after that point leaves it in `ERROR` status.
    ///
    /// # Errors
    ///
    /// - [`XferError::ConfigurationMissing`] if no download directory is usable
    /// - [`XferError::TransportFailure`] on HTTP failure
    /// - [`XferError::Io`] if the destination cannot be written
    pub async fn fetch(&self, url: &str) -> Result<TransferRecord, XferError> {
        if !self.manager.ensure_download_directory().await {
            return Err(XferError::ConfigurationMissing);
        }
        let dir = self.manager.download_dir().get().ok_or(XferError::ConfigurationMissing)?;

        let destination = unique_destination(&dir, &file_name_from_url(url)).await;
        self.manager.register(TransferRecord::new(url, destination.clone()));

        let mut received = 0u64;
        let mut total = 0u64;
        let result = self.stream_to(url, &destination, &mut received, &mut total).await;

        match result {
            Ok(()) => {
                // Servers that omit Content-Length still complete once the body ends
                if total == 0 {
                    total = received;
                }
                self.reporter.report_progress(url, received, total, TransferStatus::Downloading);
                if total == 0 {
                    // Empty body: the counters can never promote it
                    self.manager.store().set_status(url, TransferStatus::Downloaded);
                }
                info!("Downloaded {url} to {}", destination.display());
                self.manager.store().get(url).ok_or_else(|| XferError::Other {
                    message: format!("Transfer record for {url} disappeared"),
                })
            }
            Err(e) => {
                warn!("Download of {url} failed: {e}");
                self.reporter.report_progress(url, received, total, TransferStatus::Error);
                Err(e)
            }
        }
    }

    async fn stream_to(
        &self,
        url: &str,
        destination: &Path,
        received: &mut u64,
        total: &mut u64,
    ) -> Result<(), XferError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| XferError::transport("download", e))?;

        *total = response.content_length().unwrap_or(0);
        if let Some(mime) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        {
            self.manager.store().update(url, |record| record.mime_type = Some(mime));
        }
        self.reporter.report_progress(url, 0, *total, TransferStatus::Downloading);

        let bar = self.show_progress.then(|| {
            let bar = ProgressBar::new_download(*total);
            bar.set_prefix("Downloading");
            bar.set_message(file_name_from_url(url));
            bar
        });

        let mut file = tokio::fs::File::create(destination).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| XferError::transport("download", e))?;
            file.write_all(&chunk).await?;
            *received += chunk.len() as u64;
            if let Some(bar) = &bar {
                bar.set_position(*received);
            }
            // An unknown length stays 0 so the record is not promoted early
            self.reporter.report_progress(url, *received, *total, TransferStatus::Downloading);
        }
        file.flush().await?;

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        Ok(())
    }
}

/// Pick `dir/name`, or `dir/stem (n).ext` if that is taken.
async fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{stem} ({n}){ext}"));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}
