//! List tracked transfers, newest first.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::common::{CommandContext, format_record};

/// Show every tracked transfer.
///
/// # Examples
///
/// ```bash
/// xfer list
/// xfer list --json
/// ```
#[derive(Parser, Debug)]
#[command(name = "list")]
pub struct ListCommand {
    /// Print the records as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl ListCommand {
    /// Execute the list command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let records = ctx.app.store().list();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("{}", "No transfers".dimmed());
            return Ok(());
        }

        for record in &records {
            println!("{}", format_record(record));
        }
        Ok(())
    }
}
