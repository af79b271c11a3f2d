//! Progress reporting for downloads and extraction.
//!
//! Raw transport samples are turned into [`DownloadProgress`] records by a
//! [`ProgressTransformer`]. Extraction reports [`ExtractProgress`] records.
//! Both are delivered to callers as a [`ProgressEvent`] through a
//! [`ProgressCallback`], in the order the samples were observed.

use std::sync::Arc;
use std::time::Instant;

/// Rate at or above which the unit switches from KB/s to MB/s (bytes/sec).
pub const MEGA_RATE_THRESHOLD: f64 = 1024.0 * 1024.0;

/// Callback receiving progress events from the pipeline.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Unit of a reported transfer rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    /// Kilobytes per second.
    KiloBytesPerSec,
    /// Megabytes per second.
    MegaBytesPerSec,
}

impl RateUnit {
    /// Short display suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::KiloBytesPerSec => "KB/s",
            Self::MegaBytesPerSec => "MB/s",
        }
    }
}

/// A raw byte-transfer sample as observed on the transport.
///
/// `loaded` and `total` cover only the bytes requested in this session, i.e.
/// the remaining range when resuming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Bytes received in this session.
    pub loaded: u64,
    /// Bytes expected in this session, 0 when unknown.
    pub total: u64,
    /// Current transfer rate in bytes per second.
    pub rate_bytes_per_sec: f64,
}

/// Smoothed download progress for the whole asset.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    /// Bytes of the asset on disk, including the resume offset.
    pub loaded: u64,
    /// Size of the whole asset, 0 when unknown.
    pub total: u64,
    /// Percentage of the whole asset, 0-100.
    pub percentage: f64,
    /// Percentage gained since the previous sample, never negative.
    pub increment: f64,
    /// Rate value expressed in `rate_unit`.
    pub rate: f64,
    /// Unit of `rate`.
    pub rate_unit: RateUnit,
}

/// Extraction progress as a fraction of the archive byte length.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractProgress {
    /// Archive bytes consumed so far.
    pub processed: u64,
    /// Archive size in bytes.
    pub total: u64,
    /// Percentage of the archive consumed, 0-100.
    pub percentage: f64,
    /// Percentage gained since the previous sample, never negative.
    pub increment: f64,
}

/// Event emitted by the image pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A network data sample was written to the cache file.
    Download(DownloadProgress),
    /// Archive bytes flowed through the extractor.
    Extract(ExtractProgress),
}

/// Converts raw samples into whole-asset progress readings.
///
/// Holds only the previous percentage. Create a new transformer per download
/// or extraction.
#[derive(Debug, Clone)]
pub struct ProgressTransformer {
    offset: u64,
    previous_percentage: f64,
}

impl ProgressTransformer {
    /// Create a transformer for a session resuming at `offset` bytes.
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            previous_percentage: 0.0,
        }
    }

    /// The resume baseline added to every sample.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Transform a raw transport sample.
    pub fn transform(&mut self, sample: RawSample) -> DownloadProgress {
        let loaded = sample.loaded + self.offset;
        let total = if sample.total == 0 {
            0
        } else {
            sample.total + self.offset
        };
        let (percentage, increment) = self.advance(loaded, total);
        let (rate, rate_unit) = scale_rate(sample.rate_bytes_per_sec);

        DownloadProgress {
            loaded,
            total,
            percentage,
            increment,
            rate,
            rate_unit,
        }
    }

    /// Produce an extraction reading. Extraction never resumes, so the offset
    /// is not applied.
    pub fn extract(&mut self, processed: u64, total: u64) -> ExtractProgress {
        let (percentage, increment) = self.advance(processed, total);
        ExtractProgress {
            processed,
            total,
            percentage,
            increment,
        }
    }

    fn advance(&mut self, loaded: u64, total: u64) -> (f64, f64) {
        let percentage = if total == 0 {
            0.0
        } else {
            (loaded as f64 / total as f64 * 100.0).min(100.0)
        };
        let increment = (percentage - self.previous_percentage).max(0.0);
        self.previous_percentage = percentage;
        (percentage, increment)
    }
}

/// Rescale a bytes/sec rate into the display unit.
pub fn scale_rate(bytes_per_sec: f64) -> (f64, RateUnit) {
    if bytes_per_sec >= MEGA_RATE_THRESHOLD {
        (bytes_per_sec / MEGA_RATE_THRESHOLD, RateUnit::MegaBytesPerSec)
    } else {
        (bytes_per_sec / 1024.0, RateUnit::KiloBytesPerSec)
    }
}

/// Measures the average transfer rate of one session.
#[derive(Debug)]
pub(crate) struct RateMeter {
    start: Instant,
}

impl RateMeter {
    pub(crate) fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Average bytes per second since the meter started.
    pub(crate) fn rate(&self, bytes: u64) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            bytes as f64 / elapsed
        } else {
            0.0
        }
    }
}
