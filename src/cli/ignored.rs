//! Manage the list of declined update versions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use super::common::CommandContext;

/// Show or clear versions that routine update checks skip.
#[derive(Parser, Debug)]
#[command(name = "ignored")]
pub struct IgnoredCommand {
    #[command(subcommand)]
    command: IgnoredSubcommand,
}

#[derive(Subcommand, Debug)]
enum IgnoredSubcommand {
    /// Print every ignored version
    List,
    /// Forget every ignored version
    Clear,
}

impl IgnoredCommand {
    /// Execute the ignored command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;

        match self.command {
            IgnoredSubcommand::List => {
                let ignored = ctx.app.session().snapshot().ignored_versions;
                if ignored.is_empty() {
                    println!("{}", "No ignored versions".dimmed());
                }
                for version in ignored {
                    println!("{version}");
                }
            }
            IgnoredSubcommand::Clear => {
                let mut cleared = 0;
                ctx.app.session().modify(|s| {
                    cleared = s.ignored_versions.len();
                    s.ignored_versions.clear();
                });
                ctx.save()?;
                println!("{} {cleared} ignored version(s)", "✓ Cleared".green());
            }
        }
        Ok(())
    }
}
