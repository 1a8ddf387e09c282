//! [`UpdateTransport`] backed by GitHub releases.
//!
//! ```text
//! check_latest  GET /repos/{owner}/{repo}/releases/latest
//!               tag "v1.2.3" -> "1.2.3", newer than the running version?
//! download      GET asset "xfer-{arch}-{os}[.exe]" -> "<exe>.new"
//!               verify "<asset>.sha256" when present
//! install       backup "<exe>" -> replace with "<exe>.new" -> restore on failure
//! ```

use super::backup::BackupManager;
use super::config::UpgradeConfig;
use super::transport::{DownloadEvent, DownloadStream, ReleaseDescriptor, UpdateTransport};
use super::verification::ChecksumVerifier;
use crate::constants::{HTTP_READ_TIMEOUT, HTTP_TIMEOUT, USER_AGENT};
use crate::core::XferError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    name: String,
    #[serde(default)]
    size: u64,
    browser_download_url: String,
}

/// Name of the release asset built for the running platform.
///
/// # Examples
///
/// ```rust
/// let name = xfer_cli::upgrade::github::platform_asset_name();
/// assert!(name.starts_with("xfer-"));
/// ```
#[must_use]
pub fn platform_asset_name() -> String {
    let suffix = if cfg!(windows) { ".exe" } else { "" };
    format!("xfer-{}-{}{suffix}", std::env::consts::ARCH, std::env::consts::OS)
}

/// Strip a leading `v` and parse as semver.
fn parse_tag(tag: &str) -> Result<semver::Version, XferError> {
    Ok(semver::Version::parse(tag.trim().trim_start_matches('v'))?)
}

/// Pick the descriptor for `release` if it is newer than `current`.
fn newer_release(
    release: GithubRelease,
    current: &semver::Version,
    asset_name: &str,
) -> Result<Option<ReleaseDescriptor>, XferError> {
    let latest = parse_tag(&release.tag_name)?;
    if latest <= *current {
        debug!("Latest release {latest} is not newer than {current}");
        return Ok(None);
    }

    let binary = release.assets.iter().find(|a| a.name == asset_name).ok_or_else(|| {
        XferError::transport(
            "update check",
            format!("release {latest} has no asset named {asset_name}"),
        )
    })?;
    let checksum_name = format!("{asset_name}.sha256");
    let checksum_url = release
        .assets
        .iter()
        .find(|a| a.name == checksum_name)
        .map(|a| a.browser_download_url.clone());

    Ok(Some(ReleaseDescriptor {
        version: latest.to_string(),
        content_length: binary.size,
        download_url: binary.browser_download_url.clone(),
        checksum_url,
    }))
}

/// Client shared by the metadata and download requests.
///
/// Only connecting and each body read are bounded; a slow but steady
/// download runs as long as it needs.
fn build_client(read_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(HTTP_TIMEOUT)
        .read_timeout(read_timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Self-update transport talking to the GitHub releases API.
pub struct GithubReleaseTransport {
    client: reqwest::Client,
    request_timeout: Duration,
    config: UpgradeConfig,
    current_version: semver::Version,
    executable: PathBuf,
    asset_name: String,
}

impl GithubReleaseTransport {
    /// Transport for the running executable.
    ///
    /// # Errors
    ///
    /// Fails if the executable path cannot be determined, the crate version
    /// is not valid semver, or the HTTP client cannot be built.
    pub fn new(config: UpgradeConfig) -> Result<Self> {
        let executable =
            std::env::current_exe().context("Failed to locate the running executable")?;
        Self::for_executable(config, executable, env!("CARGO_PKG_VERSION"))
    }

    /// Transport that manages an explicit executable at an explicit version.
    pub fn for_executable(
        config: UpgradeConfig,
        executable: PathBuf,
        current_version: &str,
    ) -> Result<Self> {
        let current_version = semver::Version::parse(current_version)
            .context("Failed to parse current version")?;

        Ok(Self {
            client: build_client(HTTP_READ_TIMEOUT)?,
            request_timeout: HTTP_TIMEOUT,
            config,
            current_version,
            executable,
            asset_name: platform_asset_name(),
        })
    }

    /// Override the metadata request deadline and the streaming idle bound.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be rebuilt.
    pub fn with_timeouts(mut self, request: Duration, read: Duration) -> Result<Self> {
        self.client = build_client(read)?;
        self.request_timeout = request;
        Ok(self)
    }

    /// Where a downloaded binary waits until install.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        let name = self.executable.file_name().unwrap_or_default().to_string_lossy();
        self.executable.with_file_name(format!("{name}.new"))
    }

    async fn fetch_latest(&self) -> Result<GithubRelease> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.config.api_url.trim_end_matches('/'),
            self.config.repo_owner,
            self.config.repo_name
        );
        debug!("Fetching {url}");
        self.client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(self.request_timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("Failed to fetch {url}"))?
            .json::<GithubRelease>()
            .await
            .context("Malformed release metadata")
    }

    async fn replace_executable(&self, staged: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = match tokio::fs::metadata(&self.executable).await {
                Ok(meta) => meta.permissions().mode(),
                Err(_) => 0o755,
            };
            tokio::fs::set_permissions(staged, std::fs::Permissions::from_mode(mode))
                .await
                .context("Failed to set permissions on the new binary")?;
        }

        #[cfg(windows)]
        {
            // A running executable cannot be overwritten, only renamed away
            let old = self.executable.with_extension("old");
            let _ = tokio::fs::remove_file(&old).await;
            tokio::fs::rename(&self.executable, &old)
                .await
                .context("Failed to move the running binary aside")?;
        }

        tokio::fs::rename(staged, &self.executable)
            .await
            .context("Failed to move the new binary into place")
    }
}

#[async_trait]
impl UpdateTransport for GithubReleaseTransport {
    async fn check_latest(&self) -> Result<Option<ReleaseDescriptor>, XferError> {
        let release = self
            .fetch_latest()
            .await
            .map_err(|e| XferError::transport("update check", format!("{e:#}")))?;
        newer_release(release, &self.current_version, &self.asset_name)
    }

    async fn download(&self, release: &ReleaseDescriptor) -> Result<DownloadStream, XferError> {
        let response = self
            .client
            .get(&release.download_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| XferError::transport("update download", e))?;

        let content_length = response.content_length().unwrap_or(release.content_length);
        let staging = self.staging_path();
        let mut file = tokio::fs::File::create(&staging).await?;

        let client = self.client.clone();
        let checksum_url = release.checksum_url.clone().filter(|_| self.config.verify_checksum);
        let asset_name = self.asset_name.clone();
        let (tx, rx) = mpsc::channel::<Result<DownloadEvent, XferError>>(32);

        tokio::spawn(async move {
            let _ = tx.send(Ok(DownloadEvent::Started(content_length))).await;

            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let step = match chunk {
                    Ok(bytes) => file
                        .write_all(&bytes)
                        .await
                        .map(|()| DownloadEvent::Progress(bytes.len() as u64))
                        .map_err(XferError::from),
                    Err(e) => Err(XferError::transport("update download", e)),
                };
                let failed = step.is_err();
                if tx.send(step).await.is_err() || failed {
                    return;
                }
            }
            if let Err(e) = file.flush().await {
                let _ = tx.send(Err(e.into())).await;
                return;
            }
            drop(file);

            if let Some(url) = checksum_url {
                match ChecksumVerifier::verify_from_release(&client, &staging, &url, &asset_name)
                    .await
                {
                    Ok(verified) => debug!("Checksum verified: {verified}"),
                    Err(e) => {
                        let _ = tokio::fs::remove_file(&staging).await;
                        let _ = tx
                            .send(Err(XferError::transport("update download", format!("{e:#}"))))
                            .await;
                        return;
                    }
                }
            }

            let _ = tx.send(Ok(DownloadEvent::Finished)).await;
        });

        Ok(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed())
    }

    async fn install(&self, release: &ReleaseDescriptor) -> Result<(), XferError> {
        let staged = self.staging_path();
        if !tokio::fs::try_exists(&staged).await.unwrap_or(false) {
            return Err(XferError::InstallFailure {
                reason: format!("no downloaded binary at {}", staged.display()),
            });
        }

        let backup = BackupManager::new(self.executable.clone());
        if self.config.auto_backup {
            backup.create_backup().await.map_err(|e| XferError::InstallFailure {
                reason: format!("{e:#}"),
            })?;
        }

        match self.replace_executable(&staged).await {
            Ok(()) => {
                info!("Installed xfer {}", release.version);
                if let Err(e) = backup.cleanup_backup().await {
                    warn!("Failed to remove backup: {e}");
                }
                Ok(())
            }
            Err(e) => {
                warn!("Replacing the binary failed: {e:#}");
                if self.config.auto_backup {
                    if let Err(restore) = backup.restore_backup().await {
                        warn!("Restoring the backup failed: {restore:#}");
                    }
                }
                Err(XferError::InstallFailure {
                    reason: format!("{e:#}"),
                })
            }
        }
    }
}
