//! Terminal progress indicators for downloads.
//!
//! A thin wrapper around `indicatif` that respects the `XFER_NO_PROGRESS`
//! environment variable (set by `--no-progress`), in which case every bar is
//! hidden and all calls become no-ops.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable that disables progress rendering.
pub const NO_PROGRESS_ENV: &str = "XFER_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV).is_ok()
}

/// A byte-oriented progress bar or spinner.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a download bar for `len` bytes.
    ///
    /// A length of zero (unknown content length) yields a spinner instead.
    #[must_use]
    pub fn new_download(len: u64) -> Self {
        if len == 0 {
            return Self::new_spinner();
        }

        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(download_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Create a spinner for work of unknown size.
    #[must_use]
    pub fn new_spinner() -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Set the message shown next to the bar.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Set the bold prefix.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    /// Update the total length (e.g., once `Content-Length` is known).
    pub fn set_length(&self, len: u64) {
        self.inner.set_length(len);
    }

    /// Set the absolute position.
    pub fn set_position(&self, pos: u64) {
        self.inner.set_position(pos);
    }

    /// Finish and leave a final message on screen.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    /// Finish and erase the bar.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold} {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
