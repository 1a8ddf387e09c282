//! OS integration: autostart registration and process relaunch.

use crate::core::XferError;
use crate::utils::platform::get_autostart_dir;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// OS-level "start on login" registration.
#[async_trait]
pub trait Autostart: Send + Sync {
    /// Whether the application is registered to start on login.
    async fn is_enabled(&self) -> Result<bool, XferError>;

    /// Remove the registration.
    async fn disable(&self) -> Result<(), XferError>;
}

/// XDG autostart entry (`~/.config/autostart/<name>.desktop`).
#[derive(Debug, Clone)]
pub struct DesktopEntryAutostart {
    entry: PathBuf,
}

impl DesktopEntryAutostart {
    /// Entry for `app_name` in the user's autostart directory.
    ///
    /// # Errors
    ///
    /// Fails if the config directory cannot be determined.
    pub fn new(app_name: &str) -> anyhow::Result<Self> {
        Ok(Self::at(get_autostart_dir()?.join(format!("{app_name}.desktop"))))
    }

    /// Entry at an explicit path.
    pub fn at(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
        }
    }
}

#[async_trait]
impl Autostart for DesktopEntryAutostart {
    async fn is_enabled(&self) -> Result<bool, XferError> {
        Ok(tokio::fs::try_exists(&self.entry).await?)
    }

    async fn disable(&self) -> Result<(), XferError> {
        match tokio::fs::remove_file(&self.entry).await {
            Ok(()) => {
                info!("Removed autostart entry {}", self.entry.display());
                Ok(())
            }
            Err(e) => match XferError::from_remove(self.entry.display().to_string(), e) {
                XferError::NotFound {
                    ..
                } => Ok(()),
                other => Err(other),
            },
        }
    }
}

/// Restarts the application after an update or reset.
#[async_trait]
pub trait Relauncher: Send + Sync {
    /// Start a fresh copy of the application process.
    async fn relaunch(&self) -> Result<(), XferError>;

    /// Reload the current context without a new process.
    async fn reload(&self) -> Result<(), XferError>;
}

/// [`Relauncher`] that spawns the current executable with fixed arguments.
///
/// The new process is detached; the caller is expected to exit afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProcessRelauncher {
    args: Vec<String>,
}

impl ProcessRelauncher {
    /// Relaunch with `args`.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Relauncher for ProcessRelauncher {
    async fn relaunch(&self) -> Result<(), XferError> {
        let exe = std::env::current_exe()?;
        info!("Relaunching {}", exe.display());
        tokio::process::Command::new(&exe).args(&self.args).spawn()?;
        Ok(())
    }

    async fn reload(&self) -> Result<(), XferError> {
        // A CLI process has no context to reload beyond the state already
        // written to disk
        debug!("Reload requested; state will be re-read on next start");
        Ok(())
    }
}
