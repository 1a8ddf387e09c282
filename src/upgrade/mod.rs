//! Self-update for the `xfer` binary.
//!
//! The update flow is a small state machine over a single process-wide
//! [`UpdateSession`]:
//!
//! ```text
//! Idle → Checking ─┬─► UpToDate
//!                  └─► Available ─┬─► Confirmed → DownloadingUpdate → Installing → Terminal
//!                                 └─► Dismissed → Idle   (version added to the ignore list)
//! ```
//!
//! # Architecture
//!
//! - [`UpdateController`] drives the session: check, ignore-list policy,
//!   confirm/cancel, download, install. It is the error boundary; nothing
//!   escapes it except typed outcomes.
//! - [`UpdateTransport`] is where releases come from. [`GithubReleaseTransport`]
//!   is the production implementation; tests script their own.
//! - [`backup::BackupManager`] keeps a copy of the running binary while it is
//!   replaced and restores it if replacement fails.
//! - [`verification::ChecksumVerifier`] checks the downloaded binary against
//!   the release's `.sha256` asset.
//! - [`config::UpgradeConfig`] is the `[upgrade]` table of the global config.
//!
//! # Failure containment
//!
//! Every failure path (check error, download error, checksum mismatch,
//! install error) resets `is_checking_update`, `is_updating`,
//! `is_update_available`, `latest_version`, `downloaded`, `downloaded_text`
//! and `content_length` to their defaults and raises a notice. An install
//! failure is never retried automatically.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xfer_cli::platform::Platform;
//! use xfer_cli::surface::TerminalSurface;
//! use xfer_cli::upgrade::{
//!     GithubReleaseTransport, SessionCell, UpdateController, UpdateSession, config::UpgradeConfig,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = Arc::new(SessionCell::new(UpdateSession::new(env!("CARGO_PKG_VERSION"))));
//! let transport = Arc::new(GithubReleaseTransport::new(UpgradeConfig::default())?);
//! let controller = UpdateController::new(
//!     session,
//!     transport,
//!     Arc::new(TerminalSurface::new(false)),
//!     Platform::current(),
//! );
//!
//! let outcome = controller.check_for_update(true).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Backup and restoration of the binary during install.
pub mod backup;
/// The `[upgrade]` configuration table.
pub mod config;
pub mod controller;
pub mod github;
pub mod session;
pub mod transport;
/// SHA-256 verification of downloaded binaries.
pub mod verification;

pub use controller::{CheckOutcome, UpdateController, UpdateOutcome};
pub use github::GithubReleaseTransport;
pub use session::{SessionCell, UpdatePhase, UpdateSession};
pub use transport::{DownloadEvent, DownloadStream, ReleaseDescriptor, UpdateTransport};
pub use verification::ChecksumVerifier;
