//! Zip extraction for image archives.
//!
//! Entries are located through the central directory, so archives written
//! with data descriptors extract like any other. Progress is measured in
//! archive bytes read rather than entry count.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use super::error::{ManagerError, ManagerResult};
use super::progress::{ProgressCallback, ProgressEvent, ProgressTransformer};
use super::traits::ArchiveExtractor;

/// Buffer size for copying entry data (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Statistics of a finished extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Number of files written.
    pub files: usize,
    /// Number of directories created from directory entries.
    pub directories: usize,
    /// Uncompressed bytes written.
    pub bytes_written: u64,
}

/// Zip extractor for archives already on disk.
#[derive(Debug, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new zip extractor.
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        cancel: &CancellationToken,
        on_progress: Option<&ProgressCallback>,
    ) -> ManagerResult<ExtractSummary> {
        let file = File::open(archive_path).map_err(|e| ManagerError::ReadFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        let total = file
            .metadata()
            .map_err(|e| ManagerError::ReadFailed {
                path: archive_path.to_path_buf(),
                source: e,
            })?
            .len();

        if cancel.is_cancelled() {
            return Err(ManagerError::Cancelled);
        }

        fs::create_dir_all(dest_dir).map_err(|e| ManagerError::CreateDirFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            archive = %archive_path.display(),
            dest = %dest_dir.display(),
            total,
            "Extracting archive"
        );

        let extraction_error = |reason: String| ManagerError::ExtractionFailed {
            path: archive_path.to_path_buf(),
            reason,
        };

        let bytes_read = Arc::new(AtomicU64::new(0));
        let reader = CountingReader::new(BufReader::new(file), Arc::clone(&bytes_read));
        let mut archive = ZipArchive::new(reader).map_err(|e| extraction_error(e.to_string()))?;

        // Reading the central directory is not extraction work.
        let baseline = bytes_read.load(Ordering::Relaxed);
        let mut transformer = ProgressTransformer::new(0);
        let mut reported = 0u64;
        let mut report = |force: bool| {
            let processed = bytes_read
                .load(Ordering::Relaxed)
                .saturating_sub(baseline)
                .min(total);
            if force || processed > reported {
                reported = processed;
                if let Some(cb) = on_progress {
                    cb(ProgressEvent::Extract(transformer.extract(processed, total)));
                }
            }
        };

        let mut summary = ExtractSummary::default();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        for index in 0..archive.len() {
            if cancel.is_cancelled() {
                return Err(ManagerError::Cancelled);
            }

            let mut entry = archive
                .by_index(index)
                .map_err(|e| extraction_error(e.to_string()))?;

            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!(entry = entry.name(), "Skipping entry with unsafe path");
                continue;
            };
            let out_path = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| ManagerError::CreateDirFailed {
                    path: out_path.clone(),
                    source: e,
                })?;
                summary.directories += 1;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            let mut out_file = File::create(&out_path).map_err(|e| ManagerError::WriteFailed {
                path: out_path.clone(),
                source: e,
            })?;

            loop {
                if cancel.is_cancelled() {
                    return Err(ManagerError::Cancelled);
                }

                let n = entry
                    .read(&mut buffer)
                    .map_err(|e| extraction_error(e.to_string()))?;
                if n == 0 {
                    break;
                }

                out_file
                    .write_all(&buffer[..n])
                    .map_err(|e| ManagerError::WriteFailed {
                        path: out_path.clone(),
                        source: e,
                    })?;
                summary.bytes_written += n as u64;
                report(false);
            }

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode)).map_err(|e| {
                    ManagerError::WriteFailed {
                        path: out_path.clone(),
                        source: e,
                    }
                })?;
            }

            summary.files += 1;
        }

        // Central directory and headers are never fully counted, so close the
        // progress at the full archive length.
        bytes_read.store(baseline.saturating_add(total), Ordering::Relaxed);
        report(true);

        tracing::info!(
            dest = %dest_dir.display(),
            files = summary.files,
            bytes = summary.bytes_written,
            "Extraction complete"
        );

        Ok(summary)
    }
}

/// Reader wrapper counting the bytes pulled from the archive file.
struct CountingReader<R> {
    inner: R,
    bytes_read: Arc<AtomicU64>,
}

impl<R> CountingReader<R> {
    fn new(inner: R, bytes_read: Arc<AtomicU64>) -> Self {
        Self { inner, bytes_read }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extracts_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        write_archive(
            &archive,
            &[
                ("system/", b""),
                ("system/system.img", &[7u8; 4096]),
                ("info.json", b"{\"version\":\"6.0.0.129\"}"),
            ],
        );

        let dest = temp.path().join("out");
        let summary = ZipExtractor::new()
            .extract(&archive, &dest, &CancellationToken::new(), None)
            .unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.directories, 1);
        assert_eq!(summary.bytes_written, 4096 + 23);
        assert_eq!(fs::read(dest.join("system/system.img")).unwrap(), vec![7u8; 4096]);
        assert_eq!(
            fs::read_to_string(dest.join("info.json")).unwrap(),
            "{\"version\":\"6.0.0.129\"}"
        );
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for byte in data {
            crc ^= u32::from(*byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    /// A stored single-entry archive as written by streaming writers: the
    /// local header has general purpose bit 3 set and zero sizes, and the
    /// real CRC and sizes follow the data in a data descriptor.
    fn data_descriptor_archive(name: &str, data: &[u8]) -> Vec<u8> {
        let crc = crc32(data);
        let size = data.len() as u32;
        let name_len = name.len() as u16;
        let mut out = Vec::new();

        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0x0008u16.to_le_bytes()); // data descriptor flag
        out.extend_from_slice(&0u16.to_le_bytes()); // stored
        out.extend_from_slice(&0u16.to_le_bytes()); // time
        out.extend_from_slice(&0x0021u16.to_le_bytes()); // 1980-01-01
        out.extend_from_slice(&[0u8; 12]); // crc and sizes deferred
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);

        out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes()); // version made by
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0x0008u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x0021u16.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]); // extra, comment, disk, internal attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name.as_bytes());
        let cd_size = out.len() as u32 - cd_offset;

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]); // disk numbers
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_crc32_reference_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_extracts_data_descriptor_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("streamed.zip");
        fs::write(&archive, data_descriptor_archive("system/build.prop", b"api=22\n")).unwrap();

        let dest = temp.path().join("out");
        let summary = ZipExtractor::new()
            .extract(&archive, &dest, &CancellationToken::new(), None)
            .unwrap();

        assert_eq!(summary.files, 1);
        assert_eq!(summary.bytes_written, 7);
        assert_eq!(
            fs::read_to_string(dest.join("system/build.prop")).unwrap(),
            "api=22\n"
        );
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        write_archive(&archive, &[("big.bin", &payload)]);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |event: ProgressEvent| {
            if let ProgressEvent::Extract(p) = event {
                sink.lock().unwrap().push(p);
            }
        });

        ZipExtractor::new()
            .extract(
                &archive,
                &temp.path().join("out"),
                &CancellationToken::new(),
                Some(&callback),
            )
            .unwrap();

        let events = events.lock().unwrap();
        assert!(!events.is_empty());
        assert!(events
            .windows(2)
            .all(|w| w[0].processed <= w[1].processed));
        let last = events.last().unwrap();
        assert_eq!(last.processed, last.total);
        assert_eq!(last.percentage, 100.0);
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 definitely not a zip").unwrap();

        let result = ZipExtractor::new().extract(
            &archive,
            &temp.path().join("out"),
            &CancellationToken::new(),
            None,
        );
        assert!(matches!(result, Err(ManagerError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_missing_archive_fails() {
        let temp = TempDir::new().unwrap();
        let result = ZipExtractor::new().extract(
            &temp.path().join("missing.zip"),
            &temp.path().join("out"),
            &CancellationToken::new(),
            None,
        );
        assert!(matches!(result, Err(ManagerError::ReadFailed { .. })));
    }

    #[test]
    fn test_cancelled_extraction() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        write_archive(&archive, &[("a.txt", b"abc")]);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            ZipExtractor::new().extract(&archive, &temp.path().join("out"), &cancel, None);
        assert!(matches!(result, Err(ManagerError::Cancelled)));
    }
}
