//! Check for and install a newer release of xfer.

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::debug;

use super::common::CommandContext;
use crate::upgrade::{CheckOutcome, GithubReleaseTransport, UpdateOutcome, UpdateSession};
use crate::utils::ProgressBar;

/// Check for a newer release and offer to install it.
///
/// By default this is a manual check: versions previously declined are
/// offered again, and "up to date" or failure notices are always shown.
/// `--routine` runs the same check the startup hook runs instead, which
/// stays quiet and skips declined versions.
///
/// # Examples
///
/// ```bash
/// xfer update            # Ask before installing
/// xfer update --yes      # Install without asking
/// xfer update --routine  # Quiet check that honours the ignore list
/// ```
#[derive(Parser, Debug)]
#[command(name = "update")]
pub struct UpdateCommand {
    /// Install without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Run a routine check: silent when nothing is new, skips ignored versions
    #[arg(long)]
    routine: bool,
}

impl UpdateCommand {
    /// Execute the update command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load().await?;
        let manual = !self.routine;
        let outcome = run_check(&ctx, manual, self.yes).await?;

        match outcome {
            CheckOutcome::NotApplicable => {
                if manual {
                    println!("Self-update is not supported on this platform");
                }
            }
            CheckOutcome::AlreadyInProgress => println!("An update is already in progress"),
            CheckOutcome::UpToDate | CheckOutcome::Updated(UpdateOutcome::AlreadyLatest) => {}
            CheckOutcome::Ignored(version) => debug!("Version {version} is ignored"),
            CheckOutcome::Dismissed(version) => println!(
                "Skipped {version}; routine checks will not offer it again (see `xfer ignored`)"
            ),
            CheckOutcome::Updated(UpdateOutcome::Installed(version)) => println!(
                "{} {version}. Restart xfer to use the new version.",
                "✓ Updated to".green()
            ),
            CheckOutcome::Updated(UpdateOutcome::AlreadyInProgress) => {
                println!("An update is already in progress");
            }
            CheckOutcome::Updated(UpdateOutcome::DownloadFailed) => bail!("Update download failed"),
            CheckOutcome::Updated(UpdateOutcome::InstallFailed) => bail!("Update install failed"),
            CheckOutcome::Failed if manual => bail!("Update check failed"),
            CheckOutcome::Failed => {}
        }
        Ok(())
    }
}

/// Routine check run before other commands when `check_on_startup` is set.
///
/// Never fails the command it precedes; problems are only logged.
pub async fn startup_check() {
    match try_startup_check().await {
        Ok(Some(outcome)) => debug!("Startup update check: {outcome:?}"),
        Ok(None) => {}
        Err(e) => debug!("Startup update check skipped: {e:#}"),
    }
}

async fn try_startup_check() -> Result<Option<CheckOutcome>> {
    let ctx = CommandContext::load().await?;
    if !ctx.app.config().upgrade.check_on_startup {
        return Ok(None);
    }
    run_check(&ctx, false, false).await.map(Some)
}

/// Run one check (and update, if confirmed) and persist the session.
async fn run_check(ctx: &CommandContext, manual: bool, assume_yes: bool) -> Result<CheckOutcome> {
    let transport = Arc::new(GithubReleaseTransport::new(ctx.app.config().upgrade.clone())?);
    let controller = ctx.app.update_controller(transport, ctx.surface(assume_yes));

    let (stop_tx, stop_rx) = oneshot::channel();
    let renderer = tokio::spawn(render_progress(ctx.app.session().subscribe(), stop_rx));

    let outcome = controller.check_for_update(manual).await;

    let _ = stop_tx.send(());
    let _ = renderer.await;
    ctx.save()?;
    Ok(outcome)
}

/// Mirror the session counters onto a progress bar until `stop` fires.
async fn render_progress(
    mut session: watch::Receiver<UpdateSession>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut bar: Option<ProgressBar> = None;
    loop {
        tokio::select! {
            _ = &mut stop => break,
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = session.borrow_and_update().clone();
                if !snapshot.is_updating || snapshot.content_length == 0 {
                    continue;
                }
                let bar = bar.get_or_insert_with(|| ProgressBar::new_download(snapshot.content_length));
                bar.set_position(snapshot.downloaded);
                bar.set_message(snapshot.downloaded_text);
            }
        }
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}
