//! xfer CLI entry point
//!
//! Parses arguments, installs the log subscriber, runs the command and
//! prints failures with context and suggestions.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use xfer_cli::cli;
use xfer_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.build_config();

    // RUST_LOG wins over the flag-derived level
    let filter = match (std::env::var("RUST_LOG"), config.log_level.as_deref()) {
        (Ok(_), _) => Some(EnvFilter::from_default_env()),
        (Err(_), Some(level)) => Some(EnvFilter::new(level)),
        (Err(_), None) => None,
    };
    if let Some(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute_with_config(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
