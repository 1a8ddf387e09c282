use crate::constants::DEFAULT_INSTALL_DELAY_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration settings for self-update behavior.
///
/// Lives in the `[upgrade]` table of the global configuration file and
/// controls where releases come from, how long the "Installing..." label is
/// shown before the install step runs, and which safety checks wrap the
/// binary replacement.
///
/// # Default Behavior
///
/// - No update check on startup (avoids network latency on every command)
/// - Releases come from `xfer-dev/xfer` on GitHub
/// - One second between the end of the download and the install step
/// - Always create a backup of the running binary
/// - Always verify the `.sha256` sidecar when the release ships one
///
/// # Examples
///
/// ```rust
/// use xfer_cli::upgrade::config::UpgradeConfig;
///
/// let config = UpgradeConfig::default();
/// assert!(!config.check_on_startup);
/// assert_eq!(config.install_delay_ms, 1000);
/// assert!(config.auto_backup);
/// ```
///
/// ## TOML Example
/// ```toml
/// [upgrade]
/// check_on_startup = false
/// api_url = "https://api.github.com"
/// repo_owner = "xfer-dev"
/// repo_name = "xfer"
/// install_delay_ms = 1000
/// auto_backup = true
/// verify_checksum = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// Whether to run a routine (non-manual) update check when the CLI starts.
    ///
    /// Routine checks stay silent when nothing is new and skip versions on
    /// the ignore list.
    #[serde(default = "default_check_on_startup")]
    pub check_on_startup: bool,

    /// Base URL of the GitHub REST API.
    ///
    /// Point this at a GitHub Enterprise instance or a release mirror.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// GitHub account that publishes releases.
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// GitHub repository that publishes releases.
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Delay between the end of the download and the install step.
    ///
    /// Keeps the "Installing..." label visible long enough to read when the
    /// install itself is near-instant.
    #[serde(default = "default_install_delay_ms")]
    pub install_delay_ms: u64,

    /// Whether to back up the running binary before replacing it.
    ///
    /// The backup is restored automatically if replacement fails.
    #[serde(default = "default_auto_backup")]
    pub auto_backup: bool,

    /// Whether to verify downloaded binaries against the release's
    /// `.sha256` asset.
    #[serde(default = "default_verify_checksum")]
    pub verify_checksum: bool,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            check_on_startup: default_check_on_startup(),
            api_url: default_api_url(),
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            install_delay_ms: default_install_delay_ms(),
            auto_backup: default_auto_backup(),
            verify_checksum: default_verify_checksum(),
        }
    }
}

fn default_check_on_startup() -> bool {
    false
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_repo_owner() -> String {
    "xfer-dev".to_string()
}

fn default_repo_name() -> String {
    "xfer".to_string()
}

fn default_install_delay_ms() -> u64 {
    DEFAULT_INSTALL_DELAY_MS
}

fn default_auto_backup() -> bool {
    true
}

fn default_verify_checksum() -> bool {
    true
}

impl UpgradeConfig {
    /// Create an `UpgradeConfig` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The install delay as a [`Duration`].
    #[must_use]
    pub const fn install_delay(&self) -> Duration {
        Duration::from_millis(self.install_delay_ms)
    }
}
