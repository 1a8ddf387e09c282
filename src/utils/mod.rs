//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - atomic writes, directory creation and checksums
//! - [`platform`] - data/config directory lookup and path expansion
//! - [`progress`] - progress bars and spinners for downloads

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, calculate_checksum, ensure_dir};
pub use platform::{get_data_dir, is_windows, resolve_path};
pub use progress::ProgressBar;

/// Format a byte count as megabytes with two decimals (e.g. `"1.50MB"`).
///
/// # Examples
///
/// ```rust
/// use xfer_cli::utils::format_megabytes;
///
/// assert_eq!(format_megabytes(1_572_864), "1.50MB");
/// assert_eq!(format_megabytes(0), "0.00MB");
/// ```
#[must_use]
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / 1024.0 / 1024.0)
}
