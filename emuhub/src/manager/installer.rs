//! Image installer orchestrating the download pipeline.
//!
//! This module drives the full installation workflow:
//! 1. Download the archive into the cache (resuming partial files)
//! 2. Verify the SHA-256 checksum
//! 3. Extract the archive into the image directory
//! 4. Link the platform SDK into its well-known location (best effort)
//! 5. Remove the cached archive unless configured to keep it

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::image::ImageDescriptor;

use super::config::ManagerConfig;
use super::download::{verify_checksum, ResumableDownloader};
use super::error::{ManagerError, ManagerResult};
use super::extractor::{ExtractSummary, ZipExtractor};
use super::progress::ProgressCallback;
use super::symlinks::{link_sdk, SdkLink};
use super::traits::ArchiveExtractor;

/// HTTP status a server returns when the requested range starts at the end
/// of the file, i.e. the cached archive is already complete.
const RANGE_NOT_SATISFIABLE: u16 = 416;

/// Result of an image installation.
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// Identifier of the installed image.
    pub image_id: String,
    /// Directory the image was extracted into.
    pub image_path: PathBuf,
    /// Bytes received over the network in this call.
    pub bytes_downloaded: u64,
    /// Offset the download resumed from.
    pub resumed_from: u64,
    /// Extraction statistics.
    pub extracted: ExtractSummary,
    /// SDK link outcome, `None` when not configured or when linking failed.
    pub sdk_link: Option<SdkLink>,
}

/// Downloads, verifies and extracts emulator images.
pub struct ImageInstaller<E: ArchiveExtractor + 'static = ZipExtractor> {
    downloader: ResumableDownloader,
    extractor: Arc<E>,
    config: ManagerConfig,
}

impl ImageInstaller<ZipExtractor> {
    /// Create an installer using the zip extractor.
    pub fn new(config: ManagerConfig) -> ManagerResult<Self> {
        Self::with_extractor(config, ZipExtractor::new())
    }
}

impl<E: ArchiveExtractor + 'static> ImageInstaller<E> {
    /// Create an installer with a custom extractor.
    pub fn with_extractor(config: ManagerConfig, extractor: E) -> ManagerResult<Self> {
        let downloader = ResumableDownloader::with_timeout(&config.cache_dir, config.timeout)?;
        Ok(Self {
            downloader,
            extractor: Arc::new(extractor),
            config,
        })
    }

    /// The installer configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Directory an image is extracted into.
    pub fn image_path(&self, image: &ImageDescriptor) -> PathBuf {
        self.config.image_dir.join(image.image_directory())
    }

    /// Whether the image directory exists and is non-empty.
    pub fn is_installed(&self, image: &ImageDescriptor) -> bool {
        fs::read_dir(self.image_path(image))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// Install an image.
    ///
    /// Progress events from the download and extraction stages are delivered
    /// through `on_progress` in the order they occur. A checksum mismatch
    /// deletes the cached archive so the next attempt starts from scratch.
    pub async fn install(
        &self,
        image: &ImageDescriptor,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> ManagerResult<InstallResult> {
        let archive_path = self.downloader.cache_path(&image.url)?;

        // Stage 1: download
        let (bytes_downloaded, resumed_from) = if self.cached_archive_complete(image, &archive_path)
        {
            tracing::info!(image = %image.id(), "Using cached archive");
            (0, 0)
        } else {
            match self
                .downloader
                .download(&image.url, cancel, on_progress.as_ref())
                .await
            {
                Ok(outcome) => (outcome.bytes_transferred, outcome.resumed_from),
                Err(ManagerError::HttpStatus { status, .. })
                    if status == RANGE_NOT_SATISFIABLE && archive_path.exists() =>
                {
                    tracing::info!(image = %image.id(), "Cached archive already complete");
                    (0, 0)
                }
                Err(e) => return Err(e),
            }
        };

        // Stage 2: verify
        let verified = {
            let path = archive_path.clone();
            let expected = image.checksum.clone();
            let cancel = cancel.clone();
            run_blocking(move || verify_checksum(&path, &expected, &cancel)).await?
        };

        if !verified {
            if let Err(e) = fs::remove_file(&archive_path) {
                tracing::warn!(
                    path = %archive_path.display(),
                    error = %e,
                    "Failed to delete archive with bad checksum"
                );
            }
            return Err(ManagerError::ChecksumMismatch {
                filename: archive_file_label(&archive_path),
                expected: image.checksum.clone(),
            });
        }

        // Stage 3: extract
        let image_path = self.image_path(image);
        let extracted = {
            let extractor = Arc::clone(&self.extractor);
            let archive = archive_path.clone();
            let dest = image_path.clone();
            let cancel = cancel.clone();
            let progress = on_progress.clone();
            run_blocking(move || extractor.extract(&archive, &dest, &cancel, progress.as_ref()))
                .await?
        };

        // Stage 4: link the SDK. Failures never fail the installation.
        let sdk_link = match (&self.config.sdk_path, &self.config.sdk_link) {
            (Some(sdk), Some(link)) => match link_sdk(sdk, link) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to link SDK, continuing");
                    None
                }
            },
            _ => None,
        };

        // Stage 5: cleanup
        if !self.config.keep_archive {
            if let Err(e) = fs::remove_file(&archive_path) {
                tracing::warn!(
                    path = %archive_path.display(),
                    error = %e,
                    "Failed to remove archive"
                );
            }
        }

        tracing::info!(
            image = %image.id(),
            path = %image_path.display(),
            files = extracted.files,
            "Image installed"
        );

        Ok(InstallResult {
            image_id: image.id(),
            image_path,
            bytes_downloaded,
            resumed_from,
            extracted,
            sdk_link,
        })
    }

    /// Whether the cached archive already has the size the catalog reports.
    fn cached_archive_complete(&self, image: &ImageDescriptor, archive_path: &Path) -> bool {
        match (image.size, fs::metadata(archive_path)) {
            (Some(size), Ok(meta)) => meta.is_file() && meta.len() == size,
            _ => false,
        }
    }
}

/// Run a blocking pipeline stage on the blocking thread pool.
async fn run_blocking<T, F>(stage: F) -> ManagerResult<T>
where
    F: FnOnce() -> ManagerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(stage)
        .await
        .map_err(|e| ManagerError::TaskFailed(e.to_string()))?
}

fn archive_file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str) -> ImageDescriptor {
        ImageDescriptor {
            path: vec!["system-image".into(), "HarmonyOS-6.0.0".into(), "phone_arm".into()],
            os: "HarmonyOS".into(),
            version: "6.0.0.129".into(),
            api_level: "22".into(),
            arch: "arm".into(),
            device_type: "phone".into(),
            checksum: "00".into(),
            url: url.into(),
            size: None,
        }
    }

    #[test]
    fn test_image_path_joins_image_directory() {
        let installer = ImageInstaller::new(ManagerConfig::new("/cache", "/images")).unwrap();
        let path = installer.image_path(&image("https://x/phone_arm.zip"));
        assert_eq!(
            path,
            PathBuf::from("/images/system-image/HarmonyOS-6.0.0/phone_arm/")
        );
    }

    #[test]
    fn test_is_installed_requires_content() {
        let temp = tempfile::TempDir::new().unwrap();
        let installer =
            ImageInstaller::new(ManagerConfig::new(temp.path().join("cache"), temp.path()))
                .unwrap();
        let image = image("https://x/phone_arm.zip");

        assert!(!installer.is_installed(&image));

        let dir = installer.image_path(&image);
        fs::create_dir_all(&dir).unwrap();
        assert!(!installer.is_installed(&image));

        fs::write(dir.join("system.img"), b"img").unwrap();
        assert!(installer.is_installed(&image));
    }

    #[test]
    fn test_archive_file_label() {
        assert_eq!(archive_file_label(Path::new("/cache/a.zip")), "a.zip");
    }
}
