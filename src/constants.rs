//! Global constants used throughout the manager.
//!
//! Delays, file names and fixed policy lists live here so that magic values
//! stay discoverable.

use std::time::Duration;

/// Delay between the end of an update download and the install step (1 second).
///
/// When installation is near-instant the "Installing" label would otherwise
/// flash for a single frame.
pub const DEFAULT_INSTALL_DELAY_MS: u64 = 1000;

/// Delay between a full reset and the relaunch/reload (300 ms).
pub const DEFAULT_RESET_RELAUNCH_DELAY_MS: u64 = 300;

/// Name of the default download directory below the application data directory.
pub const DEFAULT_DOWNLOAD_DIR_NAME: &str = "downloads";

/// Name of the persisted state file below the application data directory.
pub const STATE_FILE_NAME: &str = "state.json";

/// Application directory name used for config, data and autostart entries.
pub const APP_DIR_NAME: &str = "xfer";

/// Label shown in `downloaded_text` once the update stream has finished.
pub const INSTALLING_LABEL: &str = "Installing...";

/// Fixed body copy of the update confirmation prompt.
pub const UPDATE_PROMPT_BODY: &str = "A new version is available. Update now?";

/// File extensions that are never opened directly.
///
/// Opening one of these reveals the containing folder instead, so a
/// downloaded executable or script is never launched by accident.
pub const HIGH_RISK_EXTENSIONS: &[&str] = &[
    ".exe", ".bat", ".cmd", ".scr", ".pif", ".vbs", ".js", ".jar", ".app", ".com", ".msi", ".dll",
];

/// Connect timeout, and total timeout for small metadata requests (30 seconds).
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest pause allowed between two reads of a streaming body (30 seconds).
///
/// Large downloads have no overall deadline, only this idle bound.
pub const HTTP_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("xfer/", env!("CARGO_PKG_VERSION"));
