//! Error types for the image manager.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur while downloading, verifying or extracting images.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a file or directory.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Transport failure while downloading. Never retried internally.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The server answered with something other than 200 or 206.
    #[error("unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Network timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The operation was cancelled through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Checksum verification failed during installation.
    #[error("checksum mismatch for {filename}: expected {expected}")]
    ChecksumMismatch { filename: String, expected: String },

    /// Archive extraction failed.
    #[error("failed to extract {}: {reason}", .path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// Symlink operation failed.
    #[error("symlink operation failed ({} -> {}): {reason}", .link.display(), .target.display())]
    SymlinkFailed {
        link: PathBuf,
        target: PathBuf,
        reason: String,
    },

    /// A blocking worker task failed to complete.
    #[error("worker task failed: {0}")]
    TaskFailed(String),

    /// Invalid path or URL provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl ManagerError {
    /// Whether this error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
