//! Unit test suite for xfer
//!
//! Drives the transfer manager, update controller, reset coordinator and
//! application context through the in-memory collaborators in
//! `xfer_cli::test_utils`. Nothing here touches the network, and only
//! `app_context_tests` touches the real filesystem (inside a temp dir).
//!
//! ```bash
//! cargo test --test unit
//! ```

mod app_context_tests;
mod reset_tests;
mod transfer_manager_tests;
mod update_controller_tests;
