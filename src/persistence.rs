//! State that survives restarts.
//!
//! Three things are persisted: the transfer records, the update ignore list
//! and the configured download directory. Everything else in the update
//! session is transient.
//!
//! The file is pretty-printed JSON written atomically (temp file + rename).
//! A corrupted file is logged and treated as empty so the application can
//! always start.

use crate::transfer::{DownloadDirectory, TransferRecord, TransferStore};
use crate::upgrade::SessionCell;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// On-disk shape of the persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Every tracked transfer.
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
    /// Versions the user declined to update to.
    #[serde(default)]
    pub ignored_versions: BTreeSet<String>,
    /// Configured download directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

/// Reads and writes [`PersistedState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// State file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state.
    ///
    /// A missing file is an empty state. So is a file that fails to parse,
    /// after a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only if an existing file cannot be read.
    pub fn load(&self) -> Result<PersistedState> {
        if !self.path.exists() {
            debug!("No state file at {}", self.path.display());
            return Ok(PersistedState::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state from {}", self.path.display()))?;

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!("State file {} is corrupted, starting fresh: {e}", self.path.display());
                Ok(PersistedState::default())
            }
        }
    }

    /// Write the state atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
        atomic_write(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write state to {}", self.path.display()))?;
        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

/// Binds the live state objects to a [`StateFile`].
pub struct Persistence {
    file: StateFile,
    store: Arc<TransferStore>,
    download_dir: Arc<DownloadDirectory>,
    session: Arc<SessionCell>,
}

impl Persistence {
    /// Bind `file` to the live state.
    pub fn new(
        file: StateFile,
        store: Arc<TransferStore>,
        download_dir: Arc<DownloadDirectory>,
        session: Arc<SessionCell>,
    ) -> Self {
        Self {
            file,
            store,
            download_dir,
            session,
        }
    }

    /// The current live state in persisted form.
    #[must_use]
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            transfers: self.store.list(),
            ignored_versions: self.session.snapshot().ignored_versions,
            download_dir: self.download_dir.get(),
        }
    }

    /// Write the live state to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.file.save(&self.snapshot())?;
        self.store.take_dirty();
        Ok(())
    }

    /// [`save`](Self::save), logging instead of returning failures.
    pub fn save_logged(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to persist state: {e:#}");
        }
    }

    /// The backing file.
    #[must_use]
    pub fn file(&self) -> &StateFile {
        &self.file
    }
}
