//! The durable URL → [`TransferRecord`] map.
//!
//! [`TransferStore`] is the single source of truth for transfer state. It is
//! backed by a sharded [`DashMap`], so progress reports for different URLs
//! never contend on one lock while updates to the same URL are applied one at
//! a time, in the order their callers reach the map.
//!
//! The store is in-memory; a dirty flag tells
//! [`Persistence`](crate::persistence::Persistence) whether a snapshot needs
//! writing.

use super::progress::ProgressReporter;
use super::record::{TransferRecord, TransferStatus};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Concurrent map of transfers keyed by URL.
#[derive(Debug, Default)]
pub struct TransferStore {
    records: DashMap<String, TransferRecord>,
    dirty: AtomicBool,
}

impl TransferStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with persisted records.
    ///
    /// The resulting store is clean.
    pub fn from_records(records: impl IntoIterator<Item = TransferRecord>) -> Self {
        let map = DashMap::new();
        for record in records {
            map.insert(record.url.clone(), record);
        }
        Self {
            records: map,
            dirty: AtomicBool::new(false),
        }
    }

    /// Register (or replace) a record.
    ///
    /// Registration must precede progress reports: reports for unknown URLs
    /// are dropped.
    pub fn register(&self, record: TransferRecord) {
        debug!("Registering transfer {}", record.url);
        self.records.insert(record.url.clone(), record);
        self.mark_dirty();
    }

    /// A copy of the record for `url`.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<TransferRecord> {
        self.records.get(url).map(|entry| entry.value().clone())
    }

    /// Whether a record exists for `url`.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.records.contains_key(url)
    }

    /// Remove the record for `url` entirely.
    pub fn remove(&self, url: &str) -> Option<TransferRecord> {
        let removed = self.records.remove(url).map(|(_, record)| record);
        if removed.is_some() {
            debug!("Removed transfer {url}");
            self.mark_dirty();
        }
        removed
    }

    /// Set the status of the record for `url`.
    ///
    /// Returns `false` if no such record exists.
    pub fn set_status(&self, url: &str, status: TransferStatus) -> bool {
        self.update(url, |record| record.status = status)
    }

    /// Mutate the record for `url` in place.
    ///
    /// Returns `false` if no such record exists.
    pub fn update<F>(&self, url: &str, f: F) -> bool
    where
        F: FnOnce(&mut TransferRecord),
    {
        match self.records.get_mut(url) {
            Some(mut entry) => {
                f(entry.value_mut());
                drop(entry);
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    /// All records sorted by `download_time`, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<TransferRecord> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| b.download_time.cmp(&a.download_time));
        records
    }

    /// All records in no particular order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TransferRecord> {
        self.records.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.clear();
        self.mark_dirty();
    }

    /// Whether the store changed since the last [`take_dirty`](Self::take_dirty).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Read and reset the dirty flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

impl ProgressReporter for TransferStore {
    fn report_progress(
        &self,
        url: &str,
        current_size: u64,
        total_size: u64,
        status: TransferStatus,
    ) {
        let Some(mut entry) = self.records.get_mut(url) else {
            trace!("Dropping progress for unregistered transfer {url}");
            return;
        };

        let changed = entry.value_mut().apply_progress(current_size, total_size, status);
        let now = entry.value().status;
        drop(entry);

        if changed {
            trace!("Progress {url}: {current_size}/{total_size} ({now})");
            self.mark_dirty();
        }
    }
}
