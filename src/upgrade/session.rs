//! Process-wide self-update session state.
//!
//! [`UpdateSession`] is plain data. [`SessionCell`] owns the single instance
//! and lets observers (the CLI progress bar, tests) subscribe to every
//! change through a `tokio::sync::watch` channel.

use super::transport::DownloadEvent;
use crate::constants::INSTALLING_LABEL;
use crate::utils::format_megabytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::watch;

/// Where the update state machine currently is.
///
/// ```text
/// Idle → Checking → UpToDate
///                 → Available → Confirmed → DownloadingUpdate → Installing → Terminal
///                             → Dismissed → Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Asking the transport for the latest release
    Checking,
    /// Nothing newer exists
    UpToDate,
    /// A newer release was found
    Available,
    /// The user accepted the prompt
    Confirmed,
    /// Bytes are arriving
    DownloadingUpdate,
    /// The install step is running
    Installing,
    /// Install succeeded; the process is expected to relaunch
    Terminal,
    /// The user declined the prompt
    Dismissed,
}

/// Flags, counters and the ignore list of the update session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSession {
    /// A check is in flight.
    pub is_checking_update: bool,
    /// A download or install is in flight.
    pub is_updating: bool,
    /// A newer release is known.
    pub is_update_available: bool,
    /// Version of the running binary.
    pub current_version: String,
    /// Version of the newest known release, empty if none.
    pub latest_version: String,
    /// Declared size of the active download.
    pub content_length: u64,
    /// Bytes received for the active download.
    pub downloaded: u64,
    /// `"X.XXMB / Y.YYMB"` while downloading, a phase label afterwards.
    pub downloaded_text: String,
    /// Versions the user has declined. Persisted.
    pub ignored_versions: BTreeSet<String>,
    /// State machine position.
    pub phase: UpdatePhase,
}

impl UpdateSession {
    /// Fresh session for the running binary.
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            is_checking_update: false,
            is_updating: false,
            is_update_available: false,
            current_version: current_version.into(),
            latest_version: String::new(),
            content_length: 0,
            downloaded: 0,
            downloaded_text: String::new(),
            ignored_versions: BTreeSet::new(),
            phase: UpdatePhase::Idle,
        }
    }

    /// Reset every transient flag and counter to its default.
    ///
    /// The ignore list and `current_version` are kept.
    pub fn reset_transient(&mut self) {
        self.is_checking_update = false;
        self.is_updating = false;
        self.is_update_available = false;
        self.latest_version.clear();
        self.content_length = 0;
        self.downloaded = 0;
        self.downloaded_text.clear();
        self.phase = UpdatePhase::Idle;
    }

    /// Add `version` to the ignore list. Returns `false` if already present.
    pub fn ignore(&mut self, version: &str) -> bool {
        self.ignored_versions.insert(version.to_string())
    }

    /// Whether `version` is on the ignore list.
    #[must_use]
    pub fn is_ignored(&self, version: &str) -> bool {
        self.ignored_versions.contains(version)
    }

    /// Fold one download event into the counters.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xfer_cli::upgrade::{DownloadEvent, UpdateSession};
    ///
    /// let mut session = UpdateSession::new("0.1.0");
    /// session.apply_event(DownloadEvent::Started(2 * 1024 * 1024));
    /// session.apply_event(DownloadEvent::Progress(1024 * 1024));
    /// assert_eq!(session.downloaded_text, "1.00MB / 2.00MB");
    /// ```
    pub fn apply_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started(content_length) => {
                self.content_length = content_length;
                self.downloaded = 0;
                self.downloaded_text.clear();
                self.phase = UpdatePhase::DownloadingUpdate;
            }
            DownloadEvent::Progress(chunk) => {
                self.downloaded = self.downloaded.saturating_add(chunk);
                self.downloaded_text = format!(
                    "{} / {}",
                    format_megabytes(self.downloaded),
                    format_megabytes(self.content_length)
                );
            }
            DownloadEvent::Finished => {
                self.downloaded_text = INSTALLING_LABEL.to_string();
                self.phase = UpdatePhase::Installing;
            }
        }
    }

    /// Whether every transient field holds its default.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.is_checking_update
            && !self.is_updating
            && !self.is_update_available
            && self.latest_version.is_empty()
            && self.content_length == 0
            && self.downloaded == 0
            && self.downloaded_text.is_empty()
    }
}

/// Owner of the single [`UpdateSession`].
#[derive(Debug)]
pub struct SessionCell {
    tx: watch::Sender<UpdateSession>,
}

impl SessionCell {
    /// Wrap `session`.
    pub fn new(session: UpdateSession) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self {
            tx,
        }
    }

    /// Mutate the session and notify subscribers.
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut UpdateSession),
    {
        self.tx.send_modify(f);
    }

    /// A copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> UpdateSession {
        self.tx.borrow().clone()
    }

    /// Receive every subsequent change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UpdateSession> {
        self.tx.subscribe()
    }
}
