//! Extension points of the image pipeline.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::error::ManagerResult;
use super::extractor::ExtractSummary;
use super::progress::ProgressCallback;

/// Unpacks a downloaded archive into a target directory.
///
/// Implementations report progress as a fraction of the archive byte length
/// and leave partial output in place on failure.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive_path` into `dest_dir`.
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        cancel: &CancellationToken,
        on_progress: Option<&ProgressCallback>,
    ) -> ManagerResult<ExtractSummary>;
}
