//! Integration test suite for xfer
//!
//! End-to-end tests that run the `xfer` binary against an isolated config
//! and state file, plus library-level flows that span several components.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: every subcommand that works without network access
//! - **transfer_flow**: the HTTP engine and progress reports through the
//!   queue into the store, then persisted and reopened
//! - **update_check**: routine and manual update checks against a loopback
//!   release server

use assert_cmd::Command;
use xfer_cli::test_utils::TestEnvironment;

mod cli;
mod transfer_flow;
mod update_check;

/// The `xfer` binary pointed at `env`, with no real home directory.
fn xfer(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("xfer").unwrap();
    cmd.env("XFER_CONFIG", &env.config_path)
        .env("XFER_NO_PROGRESS", "1")
        .env("HOME", env.path())
        .env("XDG_CONFIG_HOME", env.path().join("xdg-config"))
        .env("XDG_DATA_HOME", env.path().join("xdg-data"))
        .env_remove("RUST_LOG")
        .current_dir(env.path());
    cmd
}
