//! The narrow interface download engines use to push progress.
//!
//! An engine only needs a [`ProgressReporter`]. The store implements it
//! directly; engines that report from several tasks at once can go through a
//! [`ProgressQueue`] instead, which funnels every event through one channel
//! and applies them in send order.

use super::record::TransferStatus;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Receives progress reports from a download engine.
///
/// Implementations must not block: reports arrive once per received chunk.
pub trait ProgressReporter: Send + Sync {
    /// Record that `url` has received `current_size` of `total_size` bytes.
    ///
    /// Reports for URLs without a registered record are ignored. The final
    /// status is computed from the counters (see
    /// [`resolve_status`](super::resolve_status)); `status` is only used while
    /// the transfer is incomplete.
    fn report_progress(&self, url: &str, current_size: u64, total_size: u64, status: TransferStatus);
}

/// One queued progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Transfer key
    pub url: String,
    /// Bytes received
    pub current_size: u64,
    /// Expected bytes, zero if unknown
    pub total_size: u64,
    /// Status proposed by the engine
    pub status: TransferStatus,
}

/// Cloneable sending half of a [`ProgressQueue`].
///
/// Implements [`ProgressReporter`], so it can be handed to any engine in
/// place of the store.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressReporter for ProgressSender {
    fn report_progress(&self, url: &str, current_size: u64, total_size: u64, status: TransferStatus) {
        let event = ProgressEvent {
            url: url.to_string(),
            current_size,
            total_size,
            status,
        };
        if self.tx.send(event).is_err() {
            debug!("Progress queue closed, dropping report for {url}");
        }
    }
}

/// Background task applying queued reports to a target reporter in order.
pub struct ProgressQueue {
    handle: JoinHandle<usize>,
}

impl ProgressQueue {
    /// Spawn the queue on the current runtime.
    ///
    /// The task ends once every [`ProgressSender`] has been dropped.
    pub fn spawn(target: Arc<dyn ProgressReporter>) -> (ProgressSender, Self) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let handle = tokio::spawn(async move {
            let mut applied = 0usize;
            while let Some(event) = rx.recv().await {
                target.report_progress(
                    &event.url,
                    event.current_size,
                    event.total_size,
                    event.status,
                );
                applied += 1;
            }
            applied
        });
        (
            ProgressSender {
                tx,
            },
            Self {
                handle,
            },
        )
    }

    /// Wait for the queue to drain and return the number of applied events.
    ///
    /// All senders must be dropped first or this never returns.
    pub async fn join(self) -> usize {
        self.handle.await.unwrap_or(0)
    }
}
