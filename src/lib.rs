//! xfer - transfer and self-update manager
//!
//! Tracks arbitrary file downloads keyed by URL and keeps the `xfer` binary
//! itself up to date. Both kinds of work are long-running, report progress,
//! can be retried, and keep their status across restarts.
//!
//! # Architecture Overview
//!
//! ```text
//!  download engine ──report_progress──► TransferStore ◄── TransferManager ◄── user actions
//!                                            │              (delete/open/dir)
//!                                            ▼
//!                                       Persistence ──► state.json
//!                                            ▲
//!  UpdateTransport ◄── UpdateController ── UpdateSession (ignore list persisted)
//!                                            ▲
//!                                     ResetCoordinator
//! ```
//!
//! - The [`transfer`] store is the single source of truth for downloads.
//!   Engines only see the narrow [`transfer::ProgressReporter`] interface,
//!   and the `DOWNLOADED` status is computed from byte counters, never
//!   trusted from the caller.
//! - The [`upgrade`] controller runs one update sequence at a time over a
//!   single [`upgrade::UpdateSession`]: check, ignore-list policy,
//!   confirm/cancel, download, install.
//! - The [`reset`] coordinator returns all of it to defaults.
//!
//! Every public operation of the manager and the controller is an error
//! boundary: filesystem and transport failures become status updates, typed
//! outcomes and [`surface::Notice`]s rather than propagated errors.
//!
//! # Core Modules
//!
//! - [`transfer`] - records, store, progress reporting, manager, HTTP engine
//! - [`upgrade`] - update session, controller, GitHub transport, backups
//! - [`reset`] - reset/recovery coordinator
//! - [`persistence`] - the state file
//! - [`app`] - wiring of the process-wide state
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - global configuration (`~/.xfer/config.toml`)
//! - [`core`] - error types and user-facing error formatting
//! - [`platform`] - platform capabilities (self-update, directory picker)
//! - [`surface`] - notices and confirm/cancel prompts
//! - [`system`] - autostart and relaunch integration
//! - [`utils`] - filesystem, path and progress bar helpers
//!
//! # Collaborator seams
//!
//! Everything that touches the outside world sits behind a trait so the
//! state machines can be driven in tests:
//!
//! | Trait | Production implementation |
//! |-------|---------------------------|
//! | [`transfer::FileSystem`] | [`transfer::LocalFs`] |
//! | [`transfer::Opener`] | [`transfer::SystemOpener`] |
//! | [`transfer::DirectoryPicker`] | [`transfer::ArgPicker`] |
//! | [`surface::UserSurface`] | [`surface::TerminalSurface`] |
//! | [`upgrade::UpdateTransport`] | [`upgrade::GithubReleaseTransport`] |
//! | [`system::Autostart`] | [`system::DesktopEntryAutostart`] |
//! | [`system::Relauncher`] | [`system::ProcessRelauncher`] |

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod persistence;
pub mod platform;
pub mod reset;
pub mod surface;
pub mod system;
pub mod transfer;
pub mod upgrade;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
