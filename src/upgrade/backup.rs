use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Number of restore attempts before giving up.
const MAX_RESTORE_ATTEMPTS: u32 = 3;

/// Backs up the running binary while an update replaces it.
///
/// The backup is a copy of the executable with a `.backup` suffix in the
/// same directory, so it lives on the same filesystem and restoring it is a
/// plain copy. On Unix the executable permissions are carried over in both
/// directions.
///
/// Restoration retries a few times with a short pause because Windows keeps
/// running executables locked for a moment after the process that held them
/// exits.
///
/// # Examples
///
/// ```rust,no_run
/// use xfer_cli::upgrade::backup::BackupManager;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let backup = BackupManager::new(PathBuf::from("/usr/local/bin/xfer"));
/// backup.create_backup().await?;
///
/// let replaced_ok = false;
/// if replaced_ok {
///     backup.cleanup_backup().await?;
/// } else {
///     backup.restore_backup().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct BackupManager {
    /// Path to the binary being replaced.
    original_path: PathBuf,
    /// Path of the `.backup` copy.
    backup_path: PathBuf,
    /// Pause between restore attempts.
    retry_delay: std::time::Duration,
}

impl BackupManager {
    /// Create a manager for `executable_path`.
    ///
    /// ```rust,no_run
    /// use xfer_cli::upgrade::backup::BackupManager;
    /// use std::path::PathBuf;
    ///
    /// let manager = BackupManager::new(PathBuf::from("/usr/local/bin/xfer"));
    /// // Backup will be at /usr/local/bin/xfer.backup
    /// ```
    pub fn new(executable_path: PathBuf) -> Self {
        let mut backup_path = executable_path.clone();
        backup_path.set_file_name(format!(
            "{}.backup",
            executable_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        Self {
            original_path: executable_path,
            backup_path,
            retry_delay: std::time::Duration::from_secs(1),
        }
    }

    /// Override the pause between restore attempts.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: std::time::Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Copy the binary to the backup location, replacing any older backup.
    ///
    /// # Errors
    ///
    /// Fails if the binary does not exist or the copy cannot be written.
    pub async fn create_backup(&self) -> Result<()> {
        if !fs::try_exists(&self.original_path).await.unwrap_or(false) {
            bail!("Original file does not exist: {}", self.original_path.display());
        }

        if fs::try_exists(&self.backup_path).await.unwrap_or(false) {
            debug!("Removing old backup at {}", self.backup_path.display());
            fs::remove_file(&self.backup_path).await.context("Failed to remove old backup")?;
        }

        info!("Creating backup at {}", self.backup_path.display());
        fs::copy(&self.original_path, &self.backup_path)
            .await
            .context("Failed to create backup")?;

        #[cfg(unix)]
        {
            let metadata = fs::metadata(&self.original_path)
                .await
                .context("Failed to read original file metadata")?;
            fs::set_permissions(&self.backup_path, metadata.permissions())
                .await
                .context("Failed to set backup permissions")?;
        }

        Ok(())
    }

    /// Put the backup back in place of the binary.
    ///
    /// # Errors
    ///
    /// Fails if no backup exists or every attempt fails.
    pub async fn restore_backup(&self) -> Result<()> {
        if !self.backup_exists() {
            bail!("No backup found at {}", self.backup_path.display());
        }

        warn!("Restoring from backup at {}", self.backup_path.display());

        let mut attempts = 0;
        loop {
            match self.attempt_restore().await {
                Ok(()) => {
                    info!("Successfully restored from backup");
                    return Ok(());
                }
                Err(e) if attempts < MAX_RESTORE_ATTEMPTS - 1 => {
                    warn!("Restore attempt {} failed: {e}. Retrying...", attempts + 1);
                    tokio::time::sleep(self.retry_delay).await;
                    attempts += 1;
                }
                Err(e) => {
                    return Err(e).context(format!(
                        "Failed to restore backup after {MAX_RESTORE_ATTEMPTS} attempts"
                    ));
                }
            }
        }
    }

    async fn attempt_restore(&self) -> Result<()> {
        if fs::try_exists(&self.original_path).await.unwrap_or(false) {
            fs::remove_file(&self.original_path)
                .await
                .context("Failed to remove partially replaced binary")?;
        }

        fs::copy(&self.backup_path, &self.original_path)
            .await
            .context("Failed to restore backup")?;

        #[cfg(unix)]
        {
            let metadata =
                fs::metadata(&self.backup_path).await.context("Failed to read backup metadata")?;
            fs::set_permissions(&self.original_path, metadata.permissions())
                .await
                .context("Failed to restore permissions")?;
        }

        Ok(())
    }

    /// Remove the backup after a successful replacement. A missing backup
    /// is not an error.
    pub async fn cleanup_backup(&self) -> Result<()> {
        if self.backup_exists() {
            debug!("Cleaning up backup at {}", self.backup_path.display());
            fs::remove_file(&self.backup_path).await.context("Failed to remove backup")?;
        }
        Ok(())
    }

    /// Whether a backup file exists.
    pub fn backup_exists(&self) -> bool {
        self.backup_path.exists()
    }

    /// Location of the backup file.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}
