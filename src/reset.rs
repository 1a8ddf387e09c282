//! Returning the transfer and update core to a clean state.
//!
//! Used on logout and when persisted state is suspected to be corrupt.
//! [`ResetCoordinator::reset_all`] runs these steps in order:
//!
//! 1. Clear every transfer record.
//! 2. Reset the update session, including the ignore list.
//! 3. Forget the configured download directory.
//! 4. Except on web, re-provision the default download directory and create
//!    it on disk.
//! 5. Where self-update is supported, remove an enabled autostart entry.
//! 6. Persist the clean state.
//! 7. Wait briefly, then relaunch (desktop) or reload (everything else).
//!
//! Collaborator failures in steps 4, 5 and 7 are logged and recorded in the
//! [`ResetReport`]; they never abort the remaining steps.

use crate::persistence::Persistence;
use crate::platform::Platform;
use crate::system::{Autostart, Relauncher};
use crate::transfer::{DownloadDirectory, FileSystem, TransferStore};
use crate::upgrade::{SessionCell, UpdateSession};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How the reset ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartMode {
    /// A new process was started.
    Relaunched,
    /// The current context was reloaded.
    Reloaded,
    /// Restarting was skipped or failed.
    None,
}

/// What [`ResetCoordinator::reset_all`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    /// Number of transfer records dropped.
    pub cleared_transfers: usize,
    /// The re-provisioned download directory, if any.
    pub download_dir: Option<PathBuf>,
    /// Whether an autostart entry was removed.
    pub autostart_disabled: bool,
    /// How the process was restarted.
    pub restart: RestartMode,
}

/// Restores the core to defaults.
pub struct ResetCoordinator {
    store: Arc<TransferStore>,
    session: Arc<SessionCell>,
    download_dir: Arc<DownloadDirectory>,
    fs: Arc<dyn FileSystem>,
    autostart: Arc<dyn Autostart>,
    relauncher: Arc<dyn Relauncher>,
    persistence: Option<Arc<Persistence>>,
    platform: Platform,
    relaunch_delay: Duration,
    restart: bool,
}

impl ResetCoordinator {
    /// Create a coordinator over the live state.
    pub fn new(
        store: Arc<TransferStore>,
        session: Arc<SessionCell>,
        download_dir: Arc<DownloadDirectory>,
        fs: Arc<dyn FileSystem>,
        autostart: Arc<dyn Autostart>,
        relauncher: Arc<dyn Relauncher>,
        platform: Platform,
    ) -> Self {
        Self {
            store,
            session,
            download_dir,
            fs,
            autostart,
            relauncher,
            persistence: None,
            platform,
            relaunch_delay: Duration::from_millis(crate::constants::DEFAULT_RESET_RELAUNCH_DELAY_MS),
            restart: true,
        }
    }

    /// Persist the clean state through `persistence`.
    #[must_use]
    pub fn with_persistence(mut self, persistence: Arc<Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Set the pause before restarting.
    #[must_use]
    pub fn with_relaunch_delay(mut self, delay: Duration) -> Self {
        self.relaunch_delay = delay;
        self
    }

    /// Skip the final relaunch/reload.
    #[must_use]
    pub fn with_restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }

    /// Run every reset step.
    pub async fn reset_all(&self) -> ResetReport {
        let cleared_transfers = self.store.len();
        self.store.clear();
        info!("Cleared {cleared_transfers} transfer records");

        self.session.modify(|s| {
            let current = std::mem::take(&mut s.current_version);
            *s = UpdateSession::new(current);
        });

        self.download_dir.clear();

        let download_dir = if self.platform.is_web() {
            None
        } else {
            self.provision_default_dir().await
        };

        let autostart_disabled =
            self.platform.supports_self_update() && self.disable_autostart().await;

        if let Some(persistence) = &self.persistence {
            persistence.save_logged();
        }

        let restart = if self.restart {
            tokio::time::sleep(self.relaunch_delay).await;
            self.restart_process().await
        } else {
            RestartMode::None
        };

        ResetReport {
            cleared_transfers,
            download_dir,
            autostart_disabled,
            restart,
        }
    }

    async fn provision_default_dir(&self) -> Option<PathBuf> {
        let dir = self.download_dir.default_location().to_path_buf();
        self.download_dir.set(dir.clone());
        if !self.fs.exists(&dir).await {
            if let Err(e) = self.fs.mkdir(&dir).await {
                warn!("Failed to create default download directory {}: {e}", dir.display());
            }
        }
        Some(dir)
    }

    async fn disable_autostart(&self) -> bool {
        match self.autostart.is_enabled().await {
            Ok(true) => match self.autostart.disable().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to disable autostart: {e}");
                    false
                }
            },
            Ok(false) => false,
            Err(e) => {
                warn!("Failed to query autostart: {e}");
                false
            }
        }
    }

    async fn restart_process(&self) -> RestartMode {
        let (result, mode) = if self.platform.is_desktop() {
            (self.relauncher.relaunch().await, RestartMode::Relaunched)
        } else {
            (self.relauncher.reload().await, RestartMode::Reloaded)
        };
        match result {
            Ok(()) => mode,
            Err(e) => {
                warn!("Restart after reset failed: {e}");
                RestartMode::None
            }
        }
    }
}
