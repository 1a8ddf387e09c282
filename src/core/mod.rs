//! Core types shared by every part of the manager.
//!
//! Currently this is the error system:
//!
//! - [`XferError`] - enumerated failures of the collaborators
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any `anyhow::Error` for display
//!
//! # Examples
//!
//! ```rust,no_run
//! use xfer_cli::core::{XferError, user_friendly_error};
//!
//! let ctx = user_friendly_error(anyhow::Error::new(XferError::ConfigurationMissing));
//! ctx.display();
//! ```

pub mod error;

pub use error::{ErrorContext, XferError, user_friendly_error};
