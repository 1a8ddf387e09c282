//! Shared plumbing for CLI commands

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::AppContext;
use crate::config::GlobalConfig;
use crate::surface::{TerminalSurface, UserSurface};
use crate::transfer::{ArgPicker, SystemOpener, TransferManager, TransferRecord, TransferStatus};
use crate::utils::format_megabytes;

/// Loaded configuration plus the live state every command works on.
pub struct CommandContext {
    /// Process state loaded from the state file
    pub app: AppContext,
}

impl CommandContext {
    /// Load the config (honouring `XFER_CONFIG`) and open the persisted state.
    ///
    /// # Errors
    /// Returns an error if the config or state file exists but cannot be read
    pub async fn load() -> Result<Self> {
        let config = GlobalConfig::load().await?;
        let app = AppContext::open(config).await?;
        Ok(Self {
            app,
        })
    }

    /// Terminal surface; `assume_yes` confirms every prompt.
    #[must_use]
    pub fn surface(&self, assume_yes: bool) -> Arc<dyn UserSurface> {
        Arc::new(TerminalSurface::new(assume_yes))
    }

    /// Transfer manager whose picker answers `choice`.
    #[must_use]
    pub fn transfer_manager(&self, choice: Option<PathBuf>) -> TransferManager {
        self.app.transfer_manager(
            Arc::new(SystemOpener),
            Arc::new(ArgPicker::new(choice)),
            self.surface(false),
        )
    }

    /// Persist the live state.
    ///
    /// # Errors
    /// Returns an error if the state file cannot be written
    pub fn save(&self) -> Result<()> {
        self.app.save()
    }
}

/// Colour a status for terminal output, padded to a fixed width.
#[must_use]
pub fn colored_status(status: TransferStatus) -> String {
    let label = format!("{:<11}", status.to_string());
    match status {
        TransferStatus::Downloaded => label.green().to_string(),
        TransferStatus::Downloading => label.cyan().to_string(),
        TransferStatus::Error => label.red().to_string(),
        TransferStatus::NotFound => label.yellow().to_string(),
    }
}

/// One-line summary of a record: status, sizes, file name, URL.
#[must_use]
pub fn format_record(record: &TransferRecord) -> String {
    let sizes = if record.total_size > 0 {
        format!("{} / {}", format_megabytes(record.current_size), format_megabytes(record.total_size))
    } else {
        format_megabytes(record.current_size)
    };
    format!(
        "{} {:>21}  {}  {}",
        colored_status(record.status),
        sizes,
        record.file_name().bold(),
        record.url.dimmed()
    )
}
