//! The update state machine.
//!
//! [`UpdateController`] drives a single [`UpdateSession`] through
//! check → prompt → download → install. It is the error boundary for the
//! whole sequence: transport and install failures are logged, surfaced as a
//! [`Notice`] and folded into a typed outcome, and every failure path leaves
//! the session flags and counters at their defaults.
//!
//! At most one sequence runs at a time. A second call while one is in flight
//! returns [`CheckOutcome::AlreadyInProgress`] (or
//! [`UpdateOutcome::AlreadyInProgress`]) without touching the session.

use super::session::{SessionCell, UpdatePhase, UpdateSession};
use super::transport::{DownloadEvent, ReleaseDescriptor, UpdateTransport};
use crate::core::XferError;
use crate::platform::Platform;
use crate::surface::{Decision, Notice, NoticeKind, UpdatePrompt, UserSurface};
use crate::system::Relauncher;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of [`UpdateController::check_for_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The platform cannot self-update.
    NotApplicable,
    /// Another check or update is running.
    AlreadyInProgress,
    /// Nothing newer exists.
    UpToDate,
    /// A newer version exists but is on the ignore list (routine checks only).
    Ignored(String),
    /// The user declined; the version is now ignored.
    Dismissed(String),
    /// The user confirmed and the update ran.
    Updated(UpdateOutcome),
    /// The check itself failed.
    Failed,
}

/// Result of [`UpdateController::handle_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Another check or update is running.
    AlreadyInProgress,
    /// No descriptor could be obtained; nothing to do.
    AlreadyLatest,
    /// The download failed; the session was reset.
    DownloadFailed,
    /// The install step failed; the session was reset. No retry is attempted.
    InstallFailed,
    /// The new version is installed.
    Installed(String),
}

/// Clears the in-flight flag when the running sequence ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives the update session.
pub struct UpdateController {
    session: Arc<SessionCell>,
    transport: Arc<dyn UpdateTransport>,
    surface: Arc<dyn UserSurface>,
    platform: Platform,
    install_delay: Duration,
    relauncher: Option<Arc<dyn Relauncher>>,
    in_flight: AtomicBool,
}

impl UpdateController {
    /// Create a controller over `session`.
    pub fn new(
        session: Arc<SessionCell>,
        transport: Arc<dyn UpdateTransport>,
        surface: Arc<dyn UserSurface>,
        platform: Platform,
    ) -> Self {
        Self {
            session,
            transport,
            surface,
            platform,
            install_delay: Duration::from_millis(crate::constants::DEFAULT_INSTALL_DELAY_MS),
            relauncher: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Set the pause between the end of the download and the install step.
    #[must_use]
    pub fn with_install_delay(mut self, delay: Duration) -> Self {
        self.install_delay = delay;
        self
    }

    /// Relaunch through `relauncher` after a successful install.
    #[must_use]
    pub fn with_relauncher(mut self, relauncher: Arc<dyn Relauncher>) -> Self {
        self.relauncher = Some(relauncher);
        self
    }

    /// The session this controller drives.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionCell> {
        &self.session
    }

    /// A copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> UpdateSession {
        self.session.snapshot()
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    /// Check for a newer release and, if one exists, ask the user.
    ///
    /// A routine check (`manual == false`) is silent when nothing is new and
    /// skips versions on the ignore list. A manual check reports "up to date"
    /// and always prompts when something newer exists.
    ///
    /// Declining the prompt adds the version to the ignore list and returns
    /// the session to idle. `is_update_available` and `latest_version` keep
    /// describing the declined release so callers can still show it.
    pub async fn check_for_update(&self, manual: bool) -> CheckOutcome {
        if !self.platform.supports_self_update() {
            debug!("Self-update not supported on {}", self.platform.os());
            return CheckOutcome::NotApplicable;
        }
        let Some(_guard) = self.try_begin() else {
            debug!("Update check already in flight");
            return CheckOutcome::AlreadyInProgress;
        };

        self.session.modify(|s| {
            s.is_checking_update = true;
            s.phase = UpdatePhase::Checking;
        });

        let release = match self.transport.check_latest().await {
            Ok(release) => release,
            Err(e) => {
                warn!("Update check failed: {e}");
                self.session.modify(UpdateSession::reset_transient);
                if manual {
                    self.surface.notify(Notice::new(NoticeKind::CheckFailed));
                }
                return CheckOutcome::Failed;
            }
        };

        let Some(release) = release.filter(|r| !r.version.is_empty()) else {
            self.session.modify(|s| {
                s.reset_transient();
                s.phase = UpdatePhase::UpToDate;
            });
            if manual {
                self.surface.notify(Notice::new(NoticeKind::UpToDate));
            }
            return CheckOutcome::UpToDate;
        };

        info!("Update available: {}", release.version);
        self.session.modify(|s| {
            s.is_checking_update = false;
            s.is_update_available = true;
            s.latest_version = release.version.clone();
            s.phase = UpdatePhase::Available;
        });

        if !manual && self.session.snapshot().is_ignored(&release.version) {
            debug!("Version {} is ignored, not prompting", release.version);
            return CheckOutcome::Ignored(release.version);
        }

        match self.surface.confirm(&UpdatePrompt::for_version(&release.version)).await {
            Decision::Confirm => {
                self.session.modify(|s| s.phase = UpdatePhase::Confirmed);
                CheckOutcome::Updated(self.run_update(Some(release)).await)
            }
            Decision::Cancel => {
                info!("Ignoring version {}", release.version);
                self.session.modify(|s| {
                    s.ignore(&release.version);
                    s.phase = UpdatePhase::Idle;
                });
                CheckOutcome::Dismissed(release.version)
            }
        }
    }

    /// Download and install `release`, or the latest release if `None`.
    pub async fn handle_update(&self, release: Option<ReleaseDescriptor>) -> UpdateOutcome {
        let Some(_guard) = self.try_begin() else {
            return UpdateOutcome::AlreadyInProgress;
        };
        self.run_update(release).await
    }

    async fn run_update(&self, release: Option<ReleaseDescriptor>) -> UpdateOutcome {
        let release = match release {
            Some(release) => Some(release),
            None => match self.transport.check_latest().await {
                Ok(release) => release,
                Err(e) => {
                    warn!("Failed to resolve latest release: {e}");
                    None
                }
            },
        };
        let Some(release) = release else {
            self.surface.notify(Notice::new(NoticeKind::AlreadyLatest));
            return UpdateOutcome::AlreadyLatest;
        };

        self.session.modify(|s| {
            s.is_updating = true;
            s.content_length = 0;
            s.downloaded = 0;
            s.phase = UpdatePhase::DownloadingUpdate;
        });

        let downloaded = self.consume_download(&release).await;

        // The download phase is over whatever its outcome
        self.session.modify(|s| {
            s.is_update_available = false;
            s.is_checking_update = false;
            s.latest_version.clear();
        });

        if let Err(e) = downloaded {
            warn!("Update download failed: {e}");
            self.session.modify(UpdateSession::reset_transient);
            self.surface.notify(Notice::new(NoticeKind::UpdateFailed));
            return UpdateOutcome::DownloadFailed;
        }

        self.session.modify(|s| {
            s.downloaded_text = crate::constants::INSTALLING_LABEL.to_string();
            s.phase = UpdatePhase::Installing;
        });
        tokio::time::sleep(self.install_delay).await;

        let installed = self.transport.install(&release).await;
        self.session.modify(|s| {
            s.downloaded = 0;
            s.content_length = 0;
            s.is_updating = false;
        });

        if let Err(e) = installed {
            warn!("Update install failed: {e}");
            self.session.modify(UpdateSession::reset_transient);
            self.surface.notify(Notice::new(NoticeKind::InstallFailed));
            return UpdateOutcome::InstallFailed;
        }

        info!("Installed version {}", release.version);
        self.session.modify(|s| {
            s.downloaded_text.clear();
            s.phase = UpdatePhase::Terminal;
        });

        if let Some(relauncher) = &self.relauncher {
            if let Err(e) = relauncher.relaunch().await {
                warn!("Relaunch after update failed: {e}");
            }
        }

        UpdateOutcome::Installed(release.version)
    }

    /// Fold the download stream into the session.
    ///
    /// The download only counts as complete if the stream ended with
    /// `Finished` and delivered at least the declared length.
    async fn consume_download(&self, release: &ReleaseDescriptor) -> Result<(), XferError> {
        let mut events = self.transport.download(release).await?;
        let mut finished = false;
        while let Some(event) = events.next().await {
            let event = event?;
            finished = matches!(event, DownloadEvent::Finished);
            self.session.modify(|s| s.apply_event(event));
        }

        if !finished {
            return Err(XferError::transport(
                "update download",
                "stream ended before the download finished",
            ));
        }
        let session = self.session.snapshot();
        if session.content_length > 0 && session.downloaded < session.content_length {
            return Err(XferError::transport(
                "update download",
                format!(
                    "received {} of {} bytes",
                    session.downloaded, session.content_length
                ),
            ));
        }
        Ok(())
    }
}
