//! Platform-specific directory lookup and path helpers.
//!
//! These wrap `dirs` so that every location the manager uses is derived in
//! one place and reports a helpful message when the OS does not provide it.
//!
//! # Platform Paths
//!
//! | Purpose | Linux | macOS | Windows |
//! |---------|-------|-------|---------|
//! | data (`state.json`, `downloads/`) | `$XDG_DATA_HOME/xfer` | `~/Library/Application Support/xfer` | `%APPDATA%\xfer` |
//! | config (`config.toml`) | `~/.xfer` | `~/.xfer` | `%LOCALAPPDATA%\xfer` |
//! | autostart entries | `$XDG_CONFIG_HOME/autostart` | n/a | n/a |

use crate::constants::APP_DIR_NAME;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Whether the binary was compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// The user's home directory.
///
/// # Errors
///
/// Fails if the home directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// The application data directory (`{data_dir}/xfer`).
///
/// Holds the persisted state file and the default download directory.
///
/// # Errors
///
/// Fails if the platform data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR_NAME)).ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the APPDATA environment variable is set"
        } else if cfg!(target_os = "macos") {
            "On macOS: Check that the HOME environment variable is set"
        } else {
            "On Linux: Check that the XDG_DATA_HOME or HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine data directory.\n\n{platform_help}")
    })
}

/// The XDG autostart directory (`{config_dir}/autostart`).
///
/// # Errors
///
/// Fails if the platform configuration directory cannot be determined.
pub fn get_autostart_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("autostart"))
        .context("Could not determine configuration directory for autostart entries")
}

/// Expand `~` and environment variables in a user-supplied path.
///
/// # Errors
///
/// Fails if a referenced environment variable is not set.
///
/// # Examples
///
/// ```rust,no_run
/// use xfer_cli::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let downloads = resolve_path("~/Downloads")?;
/// assert!(downloads.is_absolute());
/// # Ok(())
/// # }
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Check whether a command is available on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}
