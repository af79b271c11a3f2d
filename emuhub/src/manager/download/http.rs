//! HTTP downloader with byte-range resume.
//!
//! Archives are written to `<cache_dir>/<archive file name>`. A partial file in
//! the cache is the resume signal: its size becomes the offset sent in a
//! `Range: bytes=<offset>-` header.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

use crate::manager::archive_file_name;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::progress::{
    ProgressCallback, ProgressEvent, ProgressTransformer, RateMeter, RawSample,
};

/// Default connect timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Buffer size for writing downloaded data (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Path of the cache file.
    pub path: PathBuf,
    /// Offset the download resumed from, 0 for a full download.
    pub resumed_from: u64,
    /// Bytes received in this session.
    pub bytes_transferred: u64,
    /// Size of the cache file after the download.
    pub total_size: u64,
}

/// Downloads archives into a cache directory, resuming partial files.
///
/// Failures are never retried here; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct ResumableDownloader {
    client: Client,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl ResumableDownloader {
    /// Create a downloader with the default timeout.
    pub fn new(cache_dir: impl Into<PathBuf>) -> ManagerResult<Self> {
        Self::with_timeout(cache_dir, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a downloader with a custom connect timeout.
    pub fn with_timeout(cache_dir: impl Into<PathBuf>, timeout: Duration) -> ManagerResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ManagerError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            timeout,
        })
    }

    /// The cache directory downloads are written to.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file path for a download URL.
    pub fn cache_path(&self, url: &str) -> ManagerResult<PathBuf> {
        let name = archive_file_name(url)
            .ok_or_else(|| ManagerError::InvalidPath(format!("no file name in URL: {}", url)))?;
        Ok(self.cache_dir.join(name))
    }

    /// Download `url` into the cache, resuming a partial cache file if present.
    ///
    /// A progress event is emitted for every data chunk received. On
    /// cancellation the request is dropped, buffered data is flushed and the
    /// partial cache file is kept so a later call can resume from it.
    pub async fn download(
        &self,
        url: &str,
        cancel: &CancellationToken,
        on_progress: Option<&ProgressCallback>,
    ) -> ManagerResult<DownloadOutcome> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| ManagerError::CreateDirFailed {
                path: self.cache_dir.clone(),
                source: e,
            })?;

        let dest = self.cache_path(url)?;
        let existing_size = match fs::metadata(&dest).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => 0,
        };

        let mut request = self.client.get(url);
        if existing_size > 0 {
            tracing::info!(url, offset = existing_size, "Resuming download");
            request = request.header(RANGE, format!("bytes={}-", existing_size));
        } else {
            tracing::info!(url, "Starting download");
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(url, "Download cancelled before response");
                return Err(ManagerError::Cancelled);
            }
            result = request.send() => result.map_err(|e| self.transport_error(url, e))?,
        };

        let offset = match response.status() {
            StatusCode::PARTIAL_CONTENT => existing_size,
            StatusCode::OK => {
                if existing_size > 0 {
                    tracing::warn!(
                        url,
                        discarded = existing_size,
                        "Server ignored range request, restarting from byte 0"
                    );
                }
                0
            }
            other => {
                return Err(ManagerError::HttpStatus {
                    url: url.to_string(),
                    status: other.as_u16(),
                })
            }
        };

        let file = if offset > 0 {
            OpenOptions::new().append(true).open(&dest).await
        } else {
            fs::File::create(&dest).await
        }
        .map_err(|e| ManagerError::WriteFailed {
            path: dest.clone(),
            source: e,
        })?;

        let session_total = response.content_length().unwrap_or(0);
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);
        let mut transformer = ProgressTransformer::new(offset);
        let meter = RateMeter::start();
        let mut transferred = 0u64;
        let mut stream = response.bytes_stream();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                chunk = stream.next() => Some(chunk),
            };

            let Some(chunk) = next else {
                drop(stream);
                // Keep what was received so a later call can resume.
                writer.flush().await.ok();
                tracing::info!(url, transferred, "Download cancelled");
                return Err(ManagerError::Cancelled);
            };

            let Some(chunk) = chunk else {
                break;
            };

            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(stream);
                    writer.flush().await.ok();
                    return Err(self.transport_error(url, e));
                }
            };

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ManagerError::WriteFailed {
                    path: dest.clone(),
                    source: e,
                })?;

            transferred += chunk.len() as u64;

            if let Some(cb) = on_progress {
                let progress = transformer.transform(RawSample {
                    loaded: transferred,
                    total: session_total,
                    rate_bytes_per_sec: meter.rate(transferred),
                });
                cb(ProgressEvent::Download(progress));
            }
        }

        writer.flush().await.map_err(|e| ManagerError::WriteFailed {
            path: dest.clone(),
            source: e,
        })?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| ManagerError::WriteFailed {
                path: dest.clone(),
                source: e,
            })?;

        tracing::info!(
            url,
            path = %dest.display(),
            resumed_from = offset,
            transferred,
            "Download complete"
        );

        Ok(DownloadOutcome {
            path: dest,
            resumed_from: offset,
            bytes_transferred: transferred,
            total_size: offset + transferred,
        })
    }

    fn transport_error(&self, url: &str, error: reqwest::Error) -> ManagerError {
        if error.is_timeout() {
            ManagerError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}
