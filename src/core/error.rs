//! Error handling for the transfer and self-update manager.
//!
//! The error system is split in two layers:
//!
//! - [`XferError`]: strongly-typed failures produced by the collaborators
//!   (filesystem, opener, update transport) and by configuration problems.
//! - [`ErrorContext`]: a wrapper used at the CLI boundary that adds
//!   user-facing details and suggestions before printing.
//!
//! The manager's public operations never let an [`XferError`] escape. They
//! catch it at the operation boundary and translate it into a status update
//! on the affected record, a typed outcome, and a [`Notice`](crate::surface::Notice)
//! for the user. Only plumbing that has no record to annotate (loading
//! configuration, persisting state) propagates errors with `anyhow`.
//!
//! # Taxonomy
//!
//! | Variant | Meaning | Handling |
//! |---------|---------|----------|
//! | [`XferError::NotFound`] | expected file missing | recorded as `NOT_FOUND` status |
//! | [`XferError::InUse`] | file locked by another process | operation aborted, record unchanged |
//! | [`XferError::TransportFailure`] | network, update check or download error | session reset, transient notice |
//! | [`XferError::InstallFailure`] | post-download install step failed | session reset, actionable notice |
//! | [`XferError::ConfigurationMissing`] | no usable download directory | operation aborted |

use colored::Colorize;
use std::fmt;
use std::io;
use thiserror::Error;

/// Errors produced by the transfer and update collaborators.
#[derive(Error, Debug)]
pub enum XferError {
    /// A file that was expected to exist is gone.
    #[error("File not found: {path}")]
    NotFound {
        /// The path that was checked
        path: String,
    },

    /// The file is held open by another process and cannot be removed.
    ///
    /// On Windows this is the common outcome of deleting a file that is still
    /// open in a viewer. The record is left untouched.
    #[error("File is in use by another process: {path}")]
    InUse {
        /// The locked path
        path: String,
    },

    /// Network, update-check or download failure.
    #[error("Transport failure during {operation}: {reason}")]
    TransportFailure {
        /// What was being attempted (e.g., "update check")
        operation: String,
        /// Underlying cause
        reason: String,
    },

    /// Installing a downloaded update failed.
    #[error("Failed to install update: {reason}")]
    InstallFailure {
        /// Underlying cause
        reason: String,
    },

    /// No download directory is configured or selectable.
    #[error("No download directory is configured")]
    ConfigurationMissing,

    /// The default handler refused to open a file or folder.
    #[error("Failed to open {path}: {reason}")]
    OpenFailed {
        /// The path that was being opened
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// The folder containing a transfer no longer exists.
    #[error("Folder not found: {path}")]
    FolderMissing {
        /// The missing folder
        path: String,
    },

    /// Self-update is not available on this platform.
    #[error("Self-update is not supported on {platform}")]
    SelfUpdateUnsupported {
        /// Name of the current platform
        platform: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error from the persisted state file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error from the configuration file.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Semver parsing error from a release descriptor.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),

    /// Any other error.
    #[error("{message}")]
    Other {
        /// Description
        message: String,
    },
}

impl XferError {
    /// Classify an IO error raised while removing `path`.
    ///
    /// `NotFound` becomes [`XferError::NotFound`]; permission and
    /// "resource busy" style failures become [`XferError::InUse`], which is
    /// how both Windows sharing violations and Unix busy files surface.
    pub fn from_remove(path: impl Into<String>, error: io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path,
            },
            io::ErrorKind::PermissionDenied
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::ExecutableFileBusy => Self::InUse {
                path,
            },
            // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
            _ if cfg!(windows) && matches!(error.raw_os_error(), Some(32 | 33)) => Self::InUse {
                path,
            },
            _ => Self::Io(error),
        }
    }

    /// Wrap any displayable error as a transport failure.
    pub fn transport(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::TransportFailure {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means the target is already gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error means the target is locked by another process.
    #[must_use]
    pub const fn is_in_use(&self) -> bool {
        matches!(self, Self::InUse { .. })
    }
}

/// An error paired with user-facing details and a suggestion.
///
/// Used by the CLI entry point to print failures in a consistent,
/// colored format:
///
/// ```text
/// error: No download directory is configured
/// details: ...
/// suggestion: Run `xfer dir set <path>` to pick one
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: XferError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no details or suggestion.
    #[must_use]
    pub const fn new(error: XferError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert an arbitrary error into an [`ErrorContext`] with suggestions.
///
/// Known [`XferError`] variants get tailored suggestions. IO and TOML errors
/// are recognized through downcasting. Everything else is reported with its
/// full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<XferError>() {
        Ok(xfer_error) => return create_error_context(xfer_error),
        Err(other) => other,
    };

    let permission_denied = error
        .downcast_ref::<io::Error>()
        .is_some_and(|io_error| io_error.kind() == io::ErrorKind::PermissionDenied);
    if permission_denied {
        return ErrorContext::new(XferError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check file ownership or close programs that hold the file open");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(XferError::Other {
            message: format!("Invalid configuration file: {toml_error}"),
        })
        .with_suggestion("Check the TOML syntax in ~/.xfer/config.toml or the file passed with --config");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(XferError::Other {
        message,
    })
}

fn create_error_context(error: XferError) -> ErrorContext {
    match &error {
        XferError::ConfigurationMissing => ErrorContext::new(error)
            .with_suggestion("Run `xfer dir set <path>` to pick a download directory")
            .with_details("Downloads are written into a single configured directory"),
        XferError::InUse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Close the program that has the file open and try again"),
        XferError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run `xfer delete <url>` again to clear the stale record"),
        XferError::TransportFailure {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check your network connection and try again later"),
        XferError::InstallFailure {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Try again later, or reinstall manually from the project's release page",
        ),
        XferError::SelfUpdateUnsupported {
            ..
        } => ErrorContext::new(error)
            .with_details("Only desktop builds can replace their own binary"),
        _ => ErrorContext::new(error),
    }
}
