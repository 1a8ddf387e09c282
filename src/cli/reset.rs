//! Return xfer to a clean state.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use super::common::CommandContext;
use crate::constants::APP_DIR_NAME;
use crate::reset::RestartMode;
use crate::system::{DesktopEntryAutostart, ProcessRelauncher};

/// Forget every transfer, the ignore list and the download directory.
///
/// Downloaded files are left on disk. The default download directory is
/// re-created, an autostart entry is removed, and xfer is started again
/// (showing the now empty transfer list) unless `--no-relaunch` is given.
#[derive(Parser, Debug)]
#[command(name = "reset")]
pub struct ResetCommand {
    /// Do not start xfer again afterwards
    #[arg(long)]
    no_relaunch: bool,
}

impl ResetCommand {
    /// Execute the reset command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let autostart = Arc::new(DesktopEntryAutostart::new(APP_DIR_NAME)?);
        let relauncher = Arc::new(ProcessRelauncher::new(["list"]));

        let report = ctx
            .app
            .reset_coordinator(autostart, relauncher)
            .with_restart(!self.no_relaunch)
            .reset_all()
            .await;

        println!(
            "{} {} transfer(s) forgotten",
            "✓ Reset complete:".green(),
            report.cleared_transfers
        );
        if let Some(dir) = &report.download_dir {
            println!("  Download directory: {}", dir.display());
        }
        if report.autostart_disabled {
            println!("  Autostart entry removed");
        }
        if report.restart == RestartMode::Relaunched {
            println!("  Relaunching...");
        }
        Ok(())
    }
}
