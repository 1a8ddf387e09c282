//! Delete a transfer and its file.

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;

use super::common::CommandContext;
use crate::transfer::DeleteOutcome;

/// Delete the downloaded file and forget the transfer.
///
/// A file held open by another program is left alone and the record kept.
#[derive(Parser, Debug)]
#[command(name = "delete")]
pub struct DeleteCommand {
    /// URL of the transfer
    url: String,

    /// Skip the existence check and attempt removal directly
    #[arg(long)]
    no_verify: bool,
}

impl DeleteCommand {
    /// Execute the delete command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let manager = ctx.transfer_manager(None);

        let outcome = manager.delete_transfer(&self.url, !self.no_verify).await;
        ctx.save()?;

        match outcome {
            DeleteOutcome::Removed => println!("{} {}", "✓ Deleted".green(), self.url),
            DeleteOutcome::MarkedNotFound => {
                println!("File was already gone; marked {} as not found", self.url);
            }
            DeleteOutcome::InUse => bail!("File for {} is in use", self.url),
            DeleteOutcome::Unknown => bail!("No transfer tracked for {}", self.url),
        }
        Ok(())
    }
}
