//! Open a downloaded file or the folder containing it.

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;

use super::common::CommandContext;
use crate::transfer::OpenOutcome;

/// Open a downloaded file with its default application.
///
/// Executables and scripts are never launched; their folder is opened
/// instead.
#[derive(Parser, Debug)]
#[command(name = "open")]
pub struct OpenCommand {
    /// URL of the transfer
    url: String,
}

impl OpenCommand {
    /// Execute the open command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let manager = ctx.transfer_manager(None);

        let outcome = manager.open_transfer(&self.url).await;
        ctx.save()?;
        report(&self.url, outcome)
    }
}

/// Open the folder containing a downloaded file.
#[derive(Parser, Debug)]
#[command(name = "reveal")]
pub struct RevealCommand {
    /// URL of the transfer
    url: String,
}

impl RevealCommand {
    /// Execute the reveal command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let manager = ctx.transfer_manager(None);

        let outcome = manager.open_containing_folder(&self.url).await;
        ctx.save()?;
        report(&self.url, outcome)
    }
}

fn report(url: &str, outcome: OpenOutcome) -> Result<()> {
    match outcome {
        OpenOutcome::Opened(path) => println!("{} {}", "✓ Opened".green(), path.display()),
        OpenOutcome::RevealedFolder(folder) => println!(
            "{} {} (executable files are not launched)",
            "✓ Opened folder".green(),
            folder.display()
        ),
        OpenOutcome::Ignored => println!("{url} is still downloading or has no known type"),
        // The surface has already reported these
        OpenOutcome::Missing | OpenOutcome::FolderMissing(_) | OpenOutcome::Failed => {}
        OpenOutcome::Unknown => bail!("No transfer tracked for {url}"),
    }
    Ok(())
}
