//! Image manager: download, verify and extract emulator image archives.
//!
//! # Pipeline
//!
//! ```text
//! remote archive ──► ResumableDownloader ──► <cache>/<archive name>
//!                                                   │
//!                                   checksum::verify_checksum (bool)
//!                                                   │
//!                                   ZipExtractor ──► <image root>/<image dir>
//!                                                   │
//!                                   symlinks::link_sdk (best effort)
//! ```
//!
//! [`ImageInstaller`] drives the whole pipeline. Every stage takes the same
//! [`CancellationToken`](tokio_util::sync::CancellationToken) and reports
//! progress through typed [`ProgressEvent`] records.

mod config;
pub mod download;
mod error;
mod extractor;
mod installer;
pub mod progress;
pub mod symlinks;
mod traits;

pub use config::ManagerConfig;
pub use download::{DownloadOutcome, ResumableDownloader};
pub use error::{ManagerError, ManagerResult};
pub use extractor::{ExtractSummary, ZipExtractor};
pub use installer::{ImageInstaller, InstallResult};
pub use progress::{
    DownloadProgress, ExtractProgress, ProgressCallback, ProgressEvent, ProgressTransformer,
    RateUnit,
};
pub use traits::ArchiveExtractor;

/// Extract the archive file name from a download URL.
///
/// Query strings and fragments are ignored. Returns `None` when the URL path
/// has no final segment.
pub fn archive_file_name(url: &str) -> Option<&str> {
    let url_path = url.split(['?', '#']).next().unwrap_or(url);
    url_path.rsplit('/').next().filter(|s| !s.is_empty())
}
