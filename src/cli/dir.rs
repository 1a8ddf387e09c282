//! Inspect and change the download directory.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;

use super::common::CommandContext;
use crate::utils::resolve_path;

/// Manage the download directory.
///
/// # Examples
///
/// ```bash
/// xfer dir show
/// xfer dir set ~/Downloads/xfer
/// xfer dir ensure
/// ```
#[derive(Parser, Debug)]
#[command(name = "dir")]
pub struct DirCommand {
    #[command(subcommand)]
    command: DirSubcommand,
}

#[derive(Subcommand, Debug)]
enum DirSubcommand {
    /// Print the configured directory
    Show,
    /// Use an existing directory for new downloads
    Set {
        /// Directory path; `~` and environment variables are expanded
        path: String,
    },
    /// Create the configured directory if it is missing
    Ensure,
}

impl DirCommand {
    /// Execute the dir command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;

        match self.command {
            DirSubcommand::Show => match ctx.app.download_dir().get() {
                Some(dir) => println!("{}", dir.display()),
                None => println!("{}", "(not set)".dimmed()),
            },
            DirSubcommand::Set {
                path,
            } => {
                let path = std::path::absolute(resolve_path(&path)?)
                    .context("Failed to resolve download directory")?;
                let manager = ctx.transfer_manager(Some(path));
                if manager.change_download_dir().await.is_none() {
                    bail!("Download directory unchanged");
                }
                ctx.save()?;
            }
            DirSubcommand::Ensure => {
                let manager = ctx.transfer_manager(None);
                if !manager.ensure_download_directory().await {
                    bail!("No usable download directory");
                }
                ctx.save()?;
                if let Some(dir) = ctx.app.download_dir().get() {
                    println!("{}", dir.display());
                }
            }
        }
        Ok(())
    }
}
