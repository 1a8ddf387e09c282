//! Wiring of the live state and its collaborators.
//!
//! [`AppContext`] owns the single transfer store, update session and
//! download directory of the process, loads them from the state file on
//! open, and hands out the components that operate on them.

use crate::config::GlobalConfig;
use crate::constants::DEFAULT_DOWNLOAD_DIR_NAME;
use crate::persistence::{Persistence, StateFile};
use crate::platform::Platform;
use crate::reset::ResetCoordinator;
use crate::surface::UserSurface;
use crate::system::{Autostart, Relauncher};
use crate::transfer::{
    DirectoryPicker, DownloadDirectory, FileSystem, LocalFs, Opener, TransferManager,
    TransferStore,
};
use crate::upgrade::{SessionCell, UpdateController, UpdateSession, UpdateTransport};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// The process-wide state and its persistence.
pub struct AppContext {
    config: GlobalConfig,
    platform: Platform,
    fs: Arc<dyn FileSystem>,
    store: Arc<TransferStore>,
    session: Arc<SessionCell>,
    download_dir: Arc<DownloadDirectory>,
    persistence: Arc<Persistence>,
}

impl AppContext {
    /// Open the state described by `config` on the current platform.
    ///
    /// # Errors
    ///
    /// Fails if the state file location cannot be determined or an existing
    /// state file cannot be read.
    pub async fn open(config: GlobalConfig) -> Result<Self> {
        let state_file = StateFile::new(config.state_file()?);
        Self::open_with(config, Platform::current(), Arc::new(LocalFs), state_file).await
    }

    /// Open with explicit collaborators.
    ///
    /// The default download directory is `downloads/` next to the state
    /// file. A persisted download directory that is unset or no longer
    /// exists is replaced by that default.
    ///
    /// # Errors
    ///
    /// Fails if an existing state file cannot be read.
    pub async fn open_with(
        config: GlobalConfig,
        platform: Platform,
        fs: Arc<dyn FileSystem>,
        state_file: StateFile,
    ) -> Result<Self> {
        let state = state_file.load()?;
        let default_dir = state_file
            .path()
            .parent()
            .map(|p| p.join(DEFAULT_DOWNLOAD_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR_NAME));

        let configured = match state.download_dir {
            Some(dir) if fs.exists(&dir).await => Some(dir),
            Some(dir) => {
                info!("Download directory {} is gone, using the default", dir.display());
                Some(default_dir.clone())
            }
            None => Some(default_dir.clone()),
        };

        debug!("Loaded {} transfers from {}", state.transfers.len(), state_file.path().display());
        let store = Arc::new(TransferStore::from_records(state.transfers));

        let mut session = UpdateSession::new(env!("CARGO_PKG_VERSION"));
        session.ignored_versions = state.ignored_versions;
        let session = Arc::new(SessionCell::new(session));

        let download_dir = Arc::new(DownloadDirectory::new(configured, default_dir));
        let persistence = Arc::new(Persistence::new(
            state_file,
            store.clone(),
            download_dir.clone(),
            session.clone(),
        ));

        Ok(Self {
            config,
            platform,
            fs,
            store,
            session,
            download_dir,
            persistence,
        })
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Platform capabilities.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// The transfer store.
    #[must_use]
    pub fn store(&self) -> &Arc<TransferStore> {
        &self.store
    }

    /// The update session.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionCell> {
        &self.session
    }

    /// The download directory slot.
    #[must_use]
    pub fn download_dir(&self) -> &Arc<DownloadDirectory> {
        &self.download_dir
    }

    /// The persistence binding.
    #[must_use]
    pub fn persistence(&self) -> &Arc<Persistence> {
        &self.persistence
    }

    /// A transfer manager over this context.
    pub fn transfer_manager(
        &self,
        opener: Arc<dyn Opener>,
        picker: Arc<dyn DirectoryPicker>,
        surface: Arc<dyn UserSurface>,
    ) -> TransferManager {
        TransferManager::new(
            self.store.clone(),
            self.download_dir.clone(),
            self.fs.clone(),
            opener,
            picker,
            surface,
            self.platform,
        )
    }

    /// An update controller over this context's session.
    pub fn update_controller(
        &self,
        transport: Arc<dyn UpdateTransport>,
        surface: Arc<dyn UserSurface>,
    ) -> UpdateController {
        UpdateController::new(self.session.clone(), transport, surface, self.platform)
            .with_install_delay(self.config.upgrade.install_delay())
    }

    /// A reset coordinator over this context.
    pub fn reset_coordinator(
        &self,
        autostart: Arc<dyn Autostart>,
        relauncher: Arc<dyn Relauncher>,
    ) -> ResetCoordinator {
        ResetCoordinator::new(
            self.store.clone(),
            self.session.clone(),
            self.download_dir.clone(),
            self.fs.clone(),
            autostart,
            relauncher,
            self.platform,
        )
        .with_persistence(self.persistence.clone())
        .with_relaunch_delay(self.config.reset_relaunch_delay())
    }

    /// Write the live state to disk.
    ///
    /// # Errors
    ///
    /// Fails if the state file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.persistence.save()
    }
}
