//! File system helpers for persisted state and staged binaries.
//!
//! Everything the manager writes that must survive a crash (the state file,
//! the configuration, a staged update binary) goes through [`atomic_write`]:
//! contents land in a sibling temp file first and are renamed into place, so
//! readers never observe a half-written file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use xfer_cli::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("/tmp/xfer"))?;
//! atomic_write(Path::new("/tmp/xfer/state.json"), b"{}")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Create `path` and all missing parents.
///
/// # Errors
///
/// Fails if the directory cannot be created or if `path` exists but is not a
/// directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| {
            let platform_help = if crate::utils::platform::is_windows() {
                "On Windows: Check that the path length is < 260 chars or that long path support is enabled"
            } else {
                "Check directory permissions and path validity"
            };

            format!("Failed to create directory: {}\n\n{}", path.display(), platform_help)
        })?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Write `content` to `path` atomically.
///
/// The data is written to `<path>.tmp`, synced, then renamed over the target.
/// Parent directories are created as needed.
///
/// # Errors
///
/// Fails if the parent cannot be created, the temp file cannot be written,
/// or the rename fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Compute the SHA-256 checksum of a file as lowercase hex.
///
/// # Errors
///
/// Fails if the file cannot be read.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to open file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    Ok(hex::encode(hasher.finalize()))
}
