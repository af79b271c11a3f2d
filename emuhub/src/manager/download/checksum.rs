//! SHA-256 checksum calculation for downloaded archives.
//!
//! A mismatch is an expected outcome, so [`verify_checksum`] reports it as
//! `Ok(false)`. Only I/O failures and cancellation are errors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use crate::manager::error::{ManagerError, ManagerResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the SHA-256 checksum of a file.
///
/// The cancellation token is checked before every read.
///
/// # Returns
///
/// The lowercase hexadecimal SHA-256 hash of the file contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the token is cancelled.
pub fn calculate_file_checksum(path: &Path, cancel: &CancellationToken) -> ManagerResult<String> {
    let mut file = File::open(path).map_err(|e| ManagerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        if cancel.is_cancelled() {
            tracing::info!(path = %path.display(), "Checksum calculation cancelled");
            return Err(ManagerError::Cancelled);
        }

        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ManagerError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify that a file matches an expected checksum.
///
/// The comparison is exact and case-sensitive against the lowercase digest.
///
/// # Returns
///
/// `Ok(true)` on match, `Ok(false)` on mismatch.
pub fn verify_checksum(
    path: &Path,
    expected: &str,
    cancel: &CancellationToken,
) -> ManagerResult<bool> {
    let actual = calculate_file_checksum(path, cancel)?;
    let matches = actual == expected;

    if matches {
        tracing::debug!(path = %path.display(), "Checksum verified");
    } else {
        tracing::warn!(
            path = %path.display(),
            expected,
            actual = %actual,
            "Checksum mismatch"
        );
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_calculate_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"hello world").unwrap();

        let checksum = calculate_file_checksum(&file_path, &CancellationToken::new()).unwrap();
        assert_eq!(checksum, HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_calculate_empty_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("empty.txt");
        File::create(&file_path).unwrap();

        let checksum = calculate_file_checksum(&file_path, &CancellationToken::new()).unwrap();
        assert_eq!(
            checksum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = verify_checksum(
            Path::new("/nonexistent/file.zip"),
            HELLO_WORLD_SHA256,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(ManagerError::ReadFailed { .. })));
    }

    #[test]
    fn test_verify_is_deterministic_and_detects_corruption() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        fs::write(&file_path, b"hello world").unwrap();
        let cancel = CancellationToken::new();

        assert!(verify_checksum(&file_path, HELLO_WORLD_SHA256, &cancel).unwrap());
        assert!(verify_checksum(&file_path, HELLO_WORLD_SHA256, &cancel).unwrap());

        fs::write(&file_path, b"hello worle").unwrap();
        assert!(!verify_checksum(&file_path, HELLO_WORLD_SHA256, &cancel).unwrap());
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        fs::write(&file_path, b"hello world").unwrap();

        let upper = HELLO_WORLD_SHA256.to_uppercase();
        assert!(!verify_checksum(&file_path, &upper, &CancellationToken::new()).unwrap());
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("large.bin");
        fs::write(&file_path, vec![0xABu8; 100_000]).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = calculate_file_checksum(&file_path, &cancel);
        assert!(matches!(result, Err(ManagerError::Cancelled)));
    }
}
