//! End-to-end tests of the image installer: download, verify, extract, link.
//!
//! Run with: `cargo test --test installer_integration`

use std::fs;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use zip::write::SimpleFileOptions;

use emuhub::image::ImageDescriptor;
use emuhub::manager::{
    ImageInstaller, ManagerConfig, ManagerError, ProgressCallback, ProgressEvent,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Build an in-memory image archive.
fn image_archive() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.add_directory("data/", options).unwrap();
    zip.start_file("system.img", options).unwrap();
    zip.write_all(&vec![7u8; 64 * 1024]).unwrap();
    zip.start_file("data/userdata.img", options).unwrap();
    zip.write_all(b"userdata").unwrap();

    zip.finish().unwrap().into_inner()
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn descriptor(url: String, checksum: String) -> ImageDescriptor {
    ImageDescriptor {
        path: vec!["system-image".into(), "HarmonyOS-6.0.0".into(), "phone_arm".into()],
        os: "HarmonyOS".into(),
        version: "6.0.0.129".into(),
        api_level: "22".into(),
        arch: "arm".into(),
        device_type: "phone".into(),
        checksum,
        url,
        size: None,
    }
}

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
async fn install_downloads_verifies_and_extracts() {
    let archive = image_archive();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/phone_arm.zip")
        .with_status(200)
        .with_body(&archive)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let config = ManagerConfig::new(temp.path().join("cache"), temp.path().join("images"));
    let installer = ImageInstaller::new(config).unwrap();
    let image = descriptor(format!("{}/phone_arm.zip", server.url()), sha256_hex(&archive));
    let (callback, events) = recorder();

    let result = installer
        .install(&image, &CancellationToken::new(), Some(callback))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.image_id, "system-image/HarmonyOS-6.0.0/phone_arm");
    assert_eq!(result.bytes_downloaded, archive.len() as u64);
    assert_eq!(result.extracted.files, 2);
    assert!(result.image_path.join("system.img").is_file());
    assert_eq!(
        fs::read(result.image_path.join("data").join("userdata.img")).unwrap(),
        b"userdata"
    );
    assert!(installer.is_installed(&image));
    assert!(!temp.path().join("cache").join("phone_arm.zip").exists());
    assert!(result.sdk_link.is_none());

    // Every download event precedes every extract event.
    let events = events.lock().unwrap();
    let first_extract = events
        .iter()
        .position(|e| matches!(e, ProgressEvent::Extract(_)))
        .unwrap();
    assert!(first_extract > 0);
    assert!(events[first_extract..]
        .iter()
        .all(|e| matches!(e, ProgressEvent::Extract(_))));
    let Some(ProgressEvent::Extract(last)) = events.last() else {
        panic!("no extract progress recorded");
    };
    assert_eq!(last.percentage, 100.0);
}

#[tokio::test]
async fn checksum_mismatch_deletes_cached_archive() {
    let archive = image_archive();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/phone_arm.zip")
        .with_status(200)
        .with_body(&archive)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let config = ManagerConfig::new(temp.path().join("cache"), temp.path().join("images"));
    let installer = ImageInstaller::new(config).unwrap();
    let image = descriptor(format!("{}/phone_arm.zip", server.url()), "0".repeat(64));

    let result = installer
        .install(&image, &CancellationToken::new(), None)
        .await;

    assert!(matches!(
        result,
        Err(ManagerError::ChecksumMismatch { filename, .. }) if filename == "phone_arm.zip"
    ));
    assert!(!temp.path().join("cache").join("phone_arm.zip").exists());
    assert!(!installer.is_installed(&image));
}

#[tokio::test]
async fn complete_cached_archive_skips_download() {
    let archive = image_archive();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/phone_arm.zip")
        .expect(0)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let cache = temp.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("phone_arm.zip"), &archive).unwrap();

    let config = ManagerConfig::new(&cache, temp.path().join("images")).with_keep_archive(true);
    let installer = ImageInstaller::new(config).unwrap();
    let mut image = descriptor(format!("{}/phone_arm.zip", server.url()), sha256_hex(&archive));
    image.size = Some(archive.len() as u64);

    let result = installer
        .install(&image, &CancellationToken::new(), None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.bytes_downloaded, 0);
    assert!(cache.join("phone_arm.zip").exists());
    assert!(installer.is_installed(&image));
}

#[cfg(unix)]
#[tokio::test]
async fn sdk_link_failure_does_not_fail_install() {
    let archive = image_archive();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/phone_arm.zip")
        .with_status(200)
        .with_body(&archive)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    // A regular file occupies the parent of the link location.
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, b"file").unwrap();

    let config = ManagerConfig::new(temp.path().join("cache"), temp.path().join("images"))
        .with_sdk_link(temp.path().join("sdk"), blocker.join("sdk"));
    let installer = ImageInstaller::new(config).unwrap();
    let image = descriptor(format!("{}/phone_arm.zip", server.url()), sha256_hex(&archive));

    let result = installer
        .install(&image, &CancellationToken::new(), None)
        .await
        .unwrap();

    assert!(result.sdk_link.is_none());
    assert!(installer.is_installed(&image));
}

#[cfg(unix)]
#[tokio::test]
async fn sdk_is_linked_after_extraction() {
    let archive = image_archive();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/phone_arm.zip")
        .with_status(200)
        .with_body(&archive)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let sdk = temp.path().join("sdk-install");
    fs::create_dir_all(&sdk).unwrap();
    let link = temp.path().join("home").join("sdk");

    let config = ManagerConfig::new(temp.path().join("cache"), temp.path().join("images"))
        .with_sdk_link(&sdk, &link);
    let installer = ImageInstaller::new(config).unwrap();
    let image = descriptor(format!("{}/phone_arm.zip", server.url()), sha256_hex(&archive));

    let result = installer
        .install(&image, &CancellationToken::new(), None)
        .await
        .unwrap();

    assert!(result.sdk_link.is_some());
    assert_eq!(fs::read_link(&link).unwrap(), sdk);
}
