//! Tracked file downloads.
//!
//! # Modules
//!
//! - [`record`] - [`TransferRecord`], [`TransferStatus`] and the pure
//!   [`resolve_status`] transition function
//! - [`store`] - [`TransferStore`], the concurrent URL-keyed map
//! - [`progress`] - [`ProgressReporter`], the interface download engines push
//!   progress through, and an ordered [`ProgressQueue`]
//! - [`files`] - [`FileSystem`] collaborator (exists/remove/mkdir)
//! - [`opener`] - [`Opener`] and [`DirectoryPicker`] collaborators
//! - [`download_dir`] - the configured [`DownloadDirectory`]
//! - [`manager`] - [`TransferManager`]: delete, open, reveal, directory setup
//! - [`engine`] - [`HttpFetcher`], the built-in HTTP download engine
//!
//! # Status lifecycle
//!
//! ```text
//! DOWNLOADING ──(current >= total > 0)──► DOWNLOADED
//!      │                                     │
//!      └──(engine failure)──► ERROR          └──(file missing)──► NOT_FOUND
//! ```
//!
//! `DOWNLOADED` is only ever computed from the byte counters and is never
//! left automatically.

pub mod download_dir;
pub mod engine;
pub mod files;
pub mod manager;
pub mod opener;
pub mod progress;
pub mod record;
pub mod store;

pub use download_dir::DownloadDirectory;
pub use engine::{HttpFetcher, file_name_from_url};
pub use files::{FileSystem, LocalFs};
pub use manager::{DeleteOutcome, OpenOutcome, TransferManager, is_high_risk};
pub use opener::{ArgPicker, DirectoryPicker, Opener, SystemOpener};
pub use progress::{ProgressEvent, ProgressQueue, ProgressReporter, ProgressSender};
pub use record::{TransferRecord, TransferStatus, resolve_status};
pub use store::TransferStore;
