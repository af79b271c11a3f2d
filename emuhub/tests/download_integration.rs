//! Integration tests for the resumable downloader against a mock HTTP server.
//!
//! Run with: `cargo test --test download_integration`

use std::fs;
use std::sync::{Arc, Mutex};

use mockito::Matcher;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use emuhub::manager::download::calculate_file_checksum;
use emuhub::manager::{ManagerError, ProgressCallback, ProgressEvent, ResumableDownloader};

// ============================================================================
// Helper Functions
// ============================================================================

/// Deterministic archive-like payload.
fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Progress callback recording every event.
fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: ProgressCallback =
        Arc::new(move |event: ProgressEvent| sink.lock().unwrap().push(event));
    (callback, events)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn full_download_writes_cache_file() {
    let body = payload(200_000);
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/images/phone.zip")
        .match_header("range", Matcher::Missing)
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ResumableDownloader::new(temp.path().join("cache")).unwrap();
    let (callback, events) = recorder();
    let url = format!("{}/images/phone.zip", server.url());

    let outcome = downloader
        .download(&url, &CancellationToken::new(), Some(&callback))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.path, temp.path().join("cache").join("phone.zip"));
    assert_eq!(outcome.resumed_from, 0);
    assert_eq!(outcome.total_size, body.len() as u64);
    assert_eq!(fs::read(&outcome.path).unwrap(), body);

    let events = events.lock().unwrap();
    assert!(!events.is_empty());
    let mut previous = 0.0;
    for event in events.iter() {
        let ProgressEvent::Download(progress) = event else {
            panic!("unexpected event {:?}", event);
        };
        assert!(progress.increment >= 0.0);
        assert!(progress.percentage >= previous);
        previous = progress.percentage;
    }
    assert_eq!(previous, 100.0);
}

#[tokio::test]
async fn resumed_download_matches_single_shot_checksum() {
    let body = payload(150_000);
    let split = 60_000;
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/images/tablet.zip")
        .match_header("range", format!("bytes={}-", split).as_str())
        .with_status(206)
        .with_body(&body[split..])
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let cache = temp.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("tablet.zip"), &body[..split]).unwrap();

    let downloader = ResumableDownloader::new(&cache).unwrap();
    let (callback, events) = recorder();
    let url = format!("{}/images/tablet.zip", server.url());

    let outcome = downloader
        .download(&url, &CancellationToken::new(), Some(&callback))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.resumed_from, split as u64);
    assert_eq!(outcome.bytes_transferred, (body.len() - split) as u64);

    let checksum = calculate_file_checksum(&outcome.path, &CancellationToken::new()).unwrap();
    assert_eq!(checksum, sha256_hex(&body));

    // Progress is reported against the whole asset, not the remaining range.
    let events = events.lock().unwrap();
    let Some(ProgressEvent::Download(first)) = events.first() else {
        panic!("no download progress recorded");
    };
    assert!(first.loaded > split as u64);
    assert_eq!(first.total, body.len() as u64);
}

#[tokio::test]
async fn ignored_range_restarts_from_zero() {
    let body = payload(50_000);
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/images/watch.zip")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let cache = temp.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("watch.zip"), b"stale partial content").unwrap();

    let downloader = ResumableDownloader::new(&cache).unwrap();
    let url = format!("{}/images/watch.zip", server.url());

    let outcome = downloader
        .download(&url, &CancellationToken::new(), None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.resumed_from, 0);
    assert_eq!(fs::read(&outcome.path).unwrap(), body);
}

#[tokio::test]
async fn unexpected_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/images/missing.zip")
        .with_status(404)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ResumableDownloader::new(temp.path()).unwrap();
    let url = format!("{}/images/missing.zip", server.url());

    let result = downloader
        .download(&url, &CancellationToken::new(), None)
        .await;

    assert!(matches!(
        result,
        Err(ManagerError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn cancellation_before_response_keeps_partial_file() {
    let server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let cache = temp.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("phone.zip"), b"partial").unwrap();

    let downloader = ResumableDownloader::new(&cache).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let url = format!("{}/images/phone.zip", server.url());

    let result = downloader.download(&url, &cancel, None).await;

    assert!(matches!(result, Err(ManagerError::Cancelled)));
    assert_eq!(fs::read(cache.join("phone.zip")).unwrap(), b"partial");
}

#[tokio::test]
async fn cancellation_mid_stream_keeps_received_bytes_and_resumes() {
    let body = payload(2_000_000);
    let mut server = mockito::Server::new_async().await;
    let full = server
        .mock("GET", "/images/pc.zip")
        .match_header("range", Matcher::Missing)
        .with_status(200)
        .with_body(&body)
        .expect(1)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let cache = temp.path().join("cache");
    let downloader = ResumableDownloader::new(&cache).unwrap();
    let url = format!("{}/images/pc.zip", server.url());

    // Cancel as soon as the first chunk has been written.
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let callback: ProgressCallback = Arc::new(move |_event: ProgressEvent| trigger.cancel());

    let result = downloader.download(&url, &cancel, Some(&callback)).await;

    full.assert_async().await;
    assert!(matches!(result, Err(ManagerError::Cancelled)));
    let partial = fs::read(cache.join("pc.zip")).unwrap();
    assert!(!partial.is_empty());
    assert!(partial.len() < body.len());
    assert_eq!(partial[..], body[..partial.len()]);

    let split = partial.len();
    let rest = server
        .mock("GET", "/images/pc.zip")
        .match_header("range", format!("bytes={}-", split).as_str())
        .with_status(206)
        .with_body(&body[split..])
        .create_async()
        .await;

    let outcome = downloader
        .download(&url, &CancellationToken::new(), None)
        .await
        .unwrap();

    rest.assert_async().await;
    assert_eq!(outcome.resumed_from, split as u64);
    let checksum = calculate_file_checksum(&outcome.path, &CancellationToken::new()).unwrap();
    assert_eq!(checksum, sha256_hex(&body));
}

#[tokio::test]
async fn connection_failure_is_not_retried() {
    let temp = TempDir::new().unwrap();
    let downloader = ResumableDownloader::new(temp.path()).unwrap();

    // Nothing listens on port 9 of the loopback interface.
    let result = downloader
        .download(
            "http://127.0.0.1:9/images/phone.zip",
            &CancellationToken::new(),
            None,
        )
        .await;

    assert!(matches!(
        result,
        Err(ManagerError::DownloadFailed { .. }) | Err(ManagerError::Timeout { .. })
    ));
}
