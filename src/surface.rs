//! User-facing notices and confirm/cancel decisions.
//!
//! Core operations never print. They hand a [`Notice`] or an
//! [`UpdatePrompt`] to a [`UserSurface`], which decides how to present it.
//! The CLI uses [`TerminalSurface`]; library callers that want no output can
//! use [`SilentSurface`].

use async_trait::async_trait;
use colored::Colorize;
use std::fmt;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information
    Info,
    /// An action completed
    Success,
    /// Recoverable problem the user should look at
    Warning,
    /// An action failed
    Error,
}

/// What a [`Notice`] is about. Stable across wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A file could not be deleted because another process holds it
    FileInUse,
    /// A transfer's file is no longer on disk
    FileMissing,
    /// A transfer's containing folder is no longer on disk
    FolderMissing,
    /// The default handler failed to open a file
    OpenFailed,
    /// The file browser failed to open a folder
    OpenFolderFailed,
    /// A picked path does not exist
    PathMissing,
    /// The download directory was changed
    DownloadDirChanged,
    /// No usable download directory could be obtained
    DownloadDirUnavailable,
    /// A manual update check found nothing newer
    UpToDate,
    /// An update was requested but no newer release exists
    AlreadyLatest,
    /// The update check failed
    CheckFailed,
    /// Downloading the update failed
    UpdateFailed,
    /// Installing the update failed
    InstallFailed,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Category
    pub kind: NoticeKind,
    /// Human-readable text
    pub message: String,
}

impl Notice {
    /// Build a notice with the default level and wording for `kind`.
    #[must_use]
    pub fn new(kind: NoticeKind) -> Self {
        let (level, message) = match kind {
            NoticeKind::FileInUse => {
                (NoticeLevel::Warning, "The file is open elsewhere. Close it and try again.")
            }
            NoticeKind::FileMissing => (
                NoticeLevel::Warning,
                "The file no longer exists. Delete the record to clear it.",
            ),
            NoticeKind::FolderMissing => (NoticeLevel::Error, "The folder does not exist."),
            NoticeKind::OpenFailed => (NoticeLevel::Error, "Failed to open the file."),
            NoticeKind::OpenFolderFailed => (NoticeLevel::Error, "Failed to open the folder."),
            NoticeKind::PathMissing => {
                (NoticeLevel::Error, "The selected path does not exist. Choose another one.")
            }
            NoticeKind::DownloadDirChanged => {
                (NoticeLevel::Success, "The download directory has been changed.")
            }
            NoticeKind::DownloadDirUnavailable => {
                (NoticeLevel::Error, "No download directory is available.")
            }
            NoticeKind::UpToDate => (NoticeLevel::Info, "You are running the latest version."),
            NoticeKind::AlreadyLatest => {
                (NoticeLevel::Info, "Already on the latest version, nothing to update.")
            }
            NoticeKind::CheckFailed => (NoticeLevel::Error, "Failed to check for updates."),
            NoticeKind::UpdateFailed => (
                NoticeLevel::Error,
                "Update failed. Check your network connection and try again later.",
            ),
            NoticeKind::InstallFailed => {
                (NoticeLevel::Error, "Installation failed. Please try again later.")
            }
        };
        Self {
            level,
            kind,
            message: message.to_string(),
        }
    }

    /// Replace the message text.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Confirm/cancel question shown when a newer version is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrompt {
    /// `"Version <x.y.z>"`
    pub title: String,
    /// Fixed copy
    pub body: String,
}

impl UpdatePrompt {
    /// Prompt for `version`.
    #[must_use]
    pub fn for_version(version: &str) -> Self {
        Self {
            title: format!("Version {version}"),
            body: crate::constants::UPDATE_PROMPT_BODY.to_string(),
        }
    }
}

/// Answer to an [`UpdatePrompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed with the update
    Confirm,
    /// Skip this version
    Cancel,
}

/// Where notices and prompts go.
#[async_trait]
pub trait UserSurface: Send + Sync {
    /// Ask the user to confirm or cancel.
    async fn confirm(&self, prompt: &UpdatePrompt) -> Decision;

    /// Show a transient notice.
    fn notify(&self, notice: Notice);
}

/// Interactive terminal surface.
///
/// Notices go to stderr, coloured by level. Prompts read a `y/N` answer from
/// stdin unless `assume_yes` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSurface {
    assume_yes: bool,
}

impl TerminalSurface {
    /// Create a surface; with `assume_yes` every prompt is confirmed.
    #[must_use]
    pub const fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
        }
    }
}

#[async_trait]
impl UserSurface for TerminalSurface {
    async fn confirm(&self, prompt: &UpdatePrompt) -> Decision {
        if self.assume_yes {
            debug!("Auto-confirming prompt '{}'", prompt.title);
            return Decision::Confirm;
        }

        let question = format!("{} {} [y/N] ", prompt.title.bold(), prompt.body);
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stderr = io::stderr();
            write!(stderr, "{question}")?;
            stderr.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) if matches!(line.trim().to_lowercase().as_str(), "y" | "yes") => {
                Decision::Confirm
            }
            Ok(Ok(_)) => Decision::Cancel,
            Ok(Err(e)) => {
                warn!("Failed to read answer: {e}");
                Decision::Cancel
            }
            Err(e) => {
                warn!("Prompt task failed: {e}");
                Decision::Cancel
            }
        }
    }

    fn notify(&self, notice: Notice) {
        let line = match notice.level {
            NoticeLevel::Info => notice.message.normal(),
            NoticeLevel::Success => format!("✓ {}", notice.message).green(),
            NoticeLevel::Warning => format!("⚠ {}", notice.message).yellow(),
            NoticeLevel::Error => format!("✗ {}", notice.message).red(),
        };
        eprintln!("{line}");
    }
}

/// Surface that logs notices and cancels every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSurface;

#[async_trait]
impl UserSurface for SilentSurface {
    async fn confirm(&self, prompt: &UpdatePrompt) -> Decision {
        debug!("Cancelling prompt '{}' (silent surface)", prompt.title);
        Decision::Cancel
    }

    fn notify(&self, notice: Notice) {
        debug!("Notice ({:?}): {}", notice.kind, notice.message);
    }
}
