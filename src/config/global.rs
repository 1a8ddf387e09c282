//! Global configuration file.
//!
//! # Location
//!
//! - **Unix/macOS**: `~/.xfer/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\xfer\config.toml`
//! - **Override**: `XFER_CONFIG` environment variable or `--config`
//!
//! # File Format
//!
//! ```toml
//! # Where persisted transfers, the ignore list and the download directory live
//! state_path = "/home/me/.local/share/xfer/state.json"
//!
//! # Pause before relaunching after `xfer reset`
//! reset_relaunch_delay_ms = 300
//!
//! [upgrade]
//! # Routine update check before every command except `update` and `reset`
//! check_on_startup = false
//! install_delay_ms = 1000
//! auto_backup = true
//! verify_checksum = true
//! ```
//!
//! A missing file is not an error: every field has a default.

use crate::constants::{APP_DIR_NAME, DEFAULT_RESET_RELAUNCH_DELAY_MS, STATE_FILE_NAME};
use crate::upgrade::config::UpgradeConfig;
use crate::utils::platform::get_data_dir;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "XFER_CONFIG";

const fn default_reset_relaunch_delay_ms() -> u64 {
    DEFAULT_RESET_RELAUNCH_DELAY_MS
}

/// User-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Override for the persisted-state file.
    ///
    /// Defaults to `<data dir>/xfer/state.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,

    /// Pause between the end of `reset` and the relaunch, in milliseconds.
    #[serde(default = "default_reset_relaunch_delay_ms")]
    pub reset_relaunch_delay_ms: u64,

    /// Self-update settings.
    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            state_path: None,
            reset_relaunch_delay_ms: default_reset_relaunch_delay_ms(),
            upgrade: UpgradeConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, honouring `XFER_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use xfer_cli::config::GlobalConfig;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = GlobalConfig::load_with_optional(None).await?;
    /// println!("Install delay: {}ms", config.upgrade.install_delay_ms);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Save to a specific file, creating parent directories.
    ///
    /// On Unix the file is made readable by its owner only.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set secure permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// The config file location: `XFER_CONFIG`, else the platform default.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory is unknown.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join(APP_DIR_NAME)
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(format!(".{APP_DIR_NAME}"))
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The persisted-state file: `state_path`, else `<data dir>/xfer/state.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the data directory is unknown.
    pub fn state_file(&self) -> Result<PathBuf> {
        match &self.state_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join(STATE_FILE_NAME)),
        }
    }

    /// The reset relaunch delay as a [`Duration`].
    #[must_use]
    pub const fn reset_relaunch_delay(&self) -> Duration {
        Duration::from_millis(self.reset_relaunch_delay_ms)
    }
}
