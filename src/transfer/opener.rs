//! Handing files and folders to the operating system.

use crate::core::XferError;
use crate::utils::platform::command_exists;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Opens a file with its default handler, or a folder in the file browser.
#[async_trait]
pub trait Opener: Send + Sync {
    /// Open `path`.
    ///
    /// # Errors
    ///
    /// Returns [`XferError::OpenFailed`] if no handler is available or the
    /// handler reports failure.
    async fn open(&self, path: &Path) -> Result<(), XferError>;
}

/// [`Opener`] that delegates to the platform launcher.
///
/// | Platform | Command |
/// |----------|---------|
/// | macOS    | `open <path>` |
/// | Windows  | `cmd /C start "" <path>` |
/// | other    | `xdg-open <path>` |
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(path: &Path) -> Result<Command, XferError> {
        let failed = |reason: &str| XferError::OpenFailed {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            Ok(cmd)
        } else if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            Ok(cmd)
        } else if command_exists("xdg-open") {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            Ok(cmd)
        } else {
            Err(failed("xdg-open is not installed"))
        }
    }
}

#[async_trait]
impl Opener for SystemOpener {
    async fn open(&self, path: &Path) -> Result<(), XferError> {
        debug!("Opening {}", path.display());
        let status = Self::command(path)?.status().await.map_err(|e| XferError::OpenFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(XferError::OpenFailed {
                path: path.display().to_string(),
                reason: format!("handler exited with {status}"),
            })
        }
    }
}

/// Asks the user for a location.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Pick a directory (`directory == true`) or a file.
    ///
    /// `None` means the user dismissed the picker.
    async fn pick(&self, directory: bool) -> Option<PathBuf>;
}

/// Picker whose answer was supplied up front, e.g. as a command-line argument.
#[derive(Debug, Clone, Default)]
pub struct ArgPicker {
    choice: Option<PathBuf>,
}

impl ArgPicker {
    /// A picker that always answers `choice`.
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self {
            choice,
        }
    }
}

#[async_trait]
impl DirectoryPicker for ArgPicker {
    async fn pick(&self, _directory: bool) -> Option<PathBuf> {
        self.choice.clone()
    }
}
