//! Configuration for the image manager.

use std::path::PathBuf;
use std::time::Duration;

use super::download::DEFAULT_TIMEOUT_SECS;

/// Configuration for the image manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory where downloaded archives are cached.
    pub cache_dir: PathBuf,

    /// Root directory images are extracted into.
    pub image_dir: PathBuf,

    /// Platform SDK directory to link after extraction, if any.
    pub sdk_path: Option<PathBuf>,

    /// Well-known location the SDK is linked to.
    pub sdk_link: Option<PathBuf>,

    /// HTTP connect timeout.
    pub timeout: Duration,

    /// Whether to keep the archive in the cache after extraction.
    pub keep_archive: bool,
}

impl ManagerConfig {
    /// Create a configuration with the given cache and image directories.
    pub fn new(cache_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            image_dir: image_dir.into(),
            sdk_path: None,
            sdk_link: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            keep_archive: false,
        }
    }

    /// Link `sdk_path` to `link` after each extraction.
    pub fn with_sdk_link(mut self, sdk_path: impl Into<PathBuf>, link: impl Into<PathBuf>) -> Self {
        self.sdk_path = Some(sdk_path.into());
        self.sdk_link = Some(link.into());
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable keeping downloaded archives.
    pub fn with_keep_archive(mut self, keep: bool) -> Self {
        self.keep_archive = keep;
        self
    }
}
