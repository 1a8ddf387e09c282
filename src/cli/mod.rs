//! Command-line interface for xfer.
//!
//! Each command lives in its own module with its own argument struct and an
//! `execute()` method. Every command opens the persisted state through
//! [`common::CommandContext`], operates on it, and saves it again when
//! something changed.
//!
//! # Available Commands
//!
//! ## Transfers
//! - `list` - Show tracked transfers, newest first
//! - `fetch` - Download a URL into the download directory
//! - `delete` - Remove a downloaded file and forget the transfer
//! - `open` - Open a downloaded file (executables open their folder instead)
//! - `reveal` - Open the folder containing a downloaded file
//! - `dir` - Show, set or create the download directory
//!
//! ## Self-update
//! - `update` - Check for a newer release and install it
//! - `ignored` - Show or clear declined versions
//!
//! ## Recovery
//! - `reset` - Forget all state and start again
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Disable progress bars and spinners
//! - `--config` - Path to custom config file
//!
//! # Example
//!
//! ```bash
//! xfer fetch https://example.com/report.pdf
//! xfer list
//! xfer open https://example.com/report.pdf
//! xfer --no-progress update --yes
//! ```

pub mod common;
mod delete;
mod dir;
mod fetch;
mod ignored;
mod list;
mod open;
mod reset;
mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::CONFIG_ENV;
use crate::utils::progress::NO_PROGRESS_ENV;

/// Runtime configuration for CLI execution.
///
/// Holds what would otherwise be read from environment variables so tests
/// can drive the CLI without touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for the log subscriber; `None` disables logging.
    pub log_level: Option<String>,

    /// Whether to disable progress bars (`XFER_NO_PROGRESS`).
    pub no_progress: bool,

    /// Custom path to the global configuration file (`XFER_CONFIG`).
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Must be called once, before any other thread is started.
    pub fn apply_to_env(&self) {
        // SAFETY: called from `main` before the runtime spawns tasks that
        // read the environment
        unsafe {
            if self.no_progress {
                std::env::set_var(NO_PROGRESS_ENV, "1");
            }

            if let Some(ref path) = self.config_path {
                std::env::set_var(CONFIG_ENV, path);
            }
        }
    }
}

/// Transfer and self-update manager.
#[derive(Parser)]
#[command(
    name = "xfer",
    about = "Track downloads and keep xfer itself up to date",
    version,
    author,
    long_about = "xfer downloads files, tracks their status across restarts, opens them safely, and updates itself from GitHub releases."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to `RUST_LOG=xfer_cli=debug`. Mutually exclusive with
    /// `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to custom global configuration file.
    ///
    /// Overrides `~/.xfer/config.toml` and the `XFER_CONFIG` variable.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable progress bars and spinners.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked transfers, newest first
    List(list::ListCommand),

    /// Download a URL into the download directory
    Fetch(fetch::FetchCommand),

    /// Delete a downloaded file and forget the transfer
    Delete(delete::DeleteCommand),

    /// Open a downloaded file
    Open(open::OpenCommand),

    /// Open the folder containing a downloaded file
    Reveal(open::RevealCommand),

    /// Show or change the download directory
    Dir(dir::DirCommand),

    /// Check for a newer xfer release and install it
    Update(update::UpdateCommand),

    /// Show or clear declined update versions
    Ignored(ignored::IgnoredCommand),

    /// Forget all state and start again
    Reset(reset::ResetCommand),
}

impl Commands {
    /// Whether the startup update check runs before this command.
    ///
    /// `update` does its own check and `reset` must start from clean state.
    const fn runs_startup_check(&self) -> bool {
        !matches!(self, Self::Update(_) | Self::Reset(_))
    }
}

impl Cli {
    /// Execute the CLI with configuration derived from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// `--verbose` maps to `debug`, `--quiet` disables logging, and the
    /// default is `warn` so command output stays readable.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("xfer_cli=debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with a specific configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();

        if self.command.runs_startup_check() {
            update::startup_check().await;
        }

        match self.command {
            Commands::List(cmd) => cmd.execute().await,
            Commands::Fetch(cmd) => cmd.execute().await,
            Commands::Delete(cmd) => cmd.execute().await,
            Commands::Open(cmd) => cmd.execute().await,
            Commands::Reveal(cmd) => cmd.execute().await,
            Commands::Dir(cmd) => cmd.execute().await,
            Commands::Update(cmd) => cmd.execute().await,
            Commands::Ignored(cmd) => cmd.execute().await,
            Commands::Reset(cmd) => cmd.execute().await,
        }
    }
}
