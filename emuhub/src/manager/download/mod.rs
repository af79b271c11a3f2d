//! HTTP download of image archives.
//!
//! This module provides:
//! - Single file downloads with byte-range resume (`http`)
//! - SHA-256 checksum verification (`checksum`)
//!
//! # Example
//!
//! ```ignore
//! use emuhub::manager::ResumableDownloader;
//! use tokio_util::sync::CancellationToken;
//!
//! let downloader = ResumableDownloader::new("/tmp/emuhub-cache")?;
//! let cancel = CancellationToken::new();
//!
//! let outcome = downloader.download(url, &cancel, None).await?;
//! let ok = emuhub::manager::download::verify_checksum(&outcome.path, expected, &cancel)?;
//! ```

pub mod checksum;
mod http;

pub use checksum::{calculate_file_checksum, verify_checksum};
pub use http::{DownloadOutcome, ResumableDownloader, DEFAULT_TIMEOUT_SECS};
