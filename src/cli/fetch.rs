//! Download a URL into the download directory.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use super::common::CommandContext;
use crate::transfer::{HttpFetcher, ProgressReporter};

/// Download a URL and track it.
///
/// The record is saved whatever the outcome, so a failed download shows up
/// as `ERROR` in `xfer list`.
#[derive(Parser, Debug)]
#[command(name = "fetch")]
pub struct FetchCommand {
    /// URL to download
    url: String,
}

impl FetchCommand {
    /// Execute the fetch command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let manager = Arc::new(ctx.transfer_manager(None));
        let reporter: Arc<dyn ProgressReporter> = ctx.app.store().clone();
        let fetcher = HttpFetcher::new(manager, reporter)?;

        let result = fetcher.fetch(&self.url).await;
        ctx.save()?;

        let record = result?;
        println!(
            "{} {} ({})",
            "✓ Downloaded".green(),
            record.local_path.display(),
            record.status
        );
        Ok(())
    }
}
