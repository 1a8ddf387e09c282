//! Test utilities for xfer
//!
//! In-memory stand-ins for every collaborator the transfer, update and reset
//! components talk to, a loopback HTTP server for the network transports,
//! and an isolated on-disk environment for exercising the binary.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xfer_cli::surface::Decision;
//! use xfer_cli::test_utils::{RecordingSurface, ScriptedTransport};
//!
//! let transport = Arc::new(ScriptedTransport::offering("9.9.9", 1000));
//! let surface = Arc::new(RecordingSurface::answering(Decision::Confirm));
//! ```

pub mod environment;
pub mod http;
pub mod mocks;

pub use environment::TestEnvironment;
pub use http::{CannedResponse, TestServer};
pub use mocks::{
    FixedPicker, MemoryFs, RecordingAutostart, RecordingOpener, RecordingRelauncher,
    RecordingSurface, ScriptedStep, ScriptedTransport,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` unset, logging is
/// enabled only when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=xfer_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
