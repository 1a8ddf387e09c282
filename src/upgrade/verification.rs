use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{debug, info, warn};

/// Verifies downloaded update binaries against published SHA-256 digests.
///
/// Releases publish a `<asset>.sha256` sidecar next to each binary. The
/// sidecar is either a bare hex digest or `sha256sum` output
/// (`<digest>  <file name>`); both are accepted.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Hex-encoded SHA-256 of the file at `file_path`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use xfer_cli::upgrade::verification::ChecksumVerifier;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let digest = ChecksumVerifier::compute_sha256(Path::new("/tmp/xfer.new")).await?;
    /// println!("SHA256: {digest}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn compute_sha256(file_path: &Path) -> Result<String> {
        debug!("Computing SHA256 checksum for {}", file_path.display());
        let path = file_path.to_path_buf();
        tokio::task::spawn_blocking(move || crate::utils::calculate_checksum(&path))
            .await
            .context("Checksum task panicked")?
    }

    /// Compare the file against `expected_checksum`, ignoring case.
    ///
    /// # Errors
    ///
    /// Fails with both digests in the message when they differ.
    pub async fn verify_checksum(file_path: &Path, expected_checksum: &str) -> Result<()> {
        info!("Verifying checksum for {}", file_path.display());

        let actual = Self::compute_sha256(file_path).await?;
        let expected = expected_checksum.trim().trim_start_matches("sha256:");

        if !actual.eq_ignore_ascii_case(expected) {
            bail!("Checksum verification failed!\n  Expected: {expected}\n  Actual:   {actual}");
        }

        info!("Checksum verification successful");
        Ok(())
    }

    /// Extract the digest for `binary_name` from a sidecar or checksums file.
    ///
    /// Returns `None` if no line matches.
    ///
    /// ```rust
    /// use xfer_cli::upgrade::verification::ChecksumVerifier;
    ///
    /// let digest = "a".repeat(64);
    /// assert_eq!(ChecksumVerifier::parse_checksum(&digest, "xfer"), Some(digest.clone()));
    ///
    /// let listing = format!("{digest}  xfer-x86_64-unknown-linux-gnu\n");
    /// assert_eq!(
    ///     ChecksumVerifier::parse_checksum(&listing, "xfer-x86_64-unknown-linux-gnu"),
    ///     Some(digest),
    /// );
    /// ```
    pub fn parse_checksum(content: &str, binary_name: &str) -> Option<String> {
        for line in content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [digest] if is_hex_digest(digest) => return Some((*digest).to_string()),
                [digest, filename] => {
                    let filename = filename.trim_start_matches('*');
                    if filename == binary_name || filename.ends_with(&format!("/{binary_name}")) {
                        return Some((*digest).to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Download the sidecar at `checksum_url` and verify `file_path` against it.
    ///
    /// Returns `Ok(false)` if the sidecar is unavailable (verification
    /// skipped) and `Ok(true)` if it matched.
    ///
    /// # Errors
    ///
    /// Fails if the digest does not match.
    pub async fn verify_from_release(
        client: &reqwest::Client,
        file_path: &Path,
        checksum_url: &str,
        binary_name: &str,
    ) -> Result<bool> {
        debug!("Fetching checksum from {checksum_url}");
        let response = client
            .get(checksum_url)
            .timeout(crate::constants::HTTP_TIMEOUT)
            .send()
            .await
            .context("Failed to fetch checksum file")?;

        if !response.status().is_success() {
            warn!("Failed to fetch checksum file: HTTP {}", response.status());
            return Ok(false);
        }

        let content = response.text().await.context("Failed to read checksum file")?;
        match Self::parse_checksum(&content, binary_name) {
            Some(expected) => {
                Self::verify_checksum(file_path, &expected).await?;
                Ok(true)
            }
            None => {
                warn!("No checksum found for {binary_name}, skipping verification");
                Ok(false)
            }
        }
    }
}

fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}
