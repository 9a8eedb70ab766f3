//! End-to-end downloader tests against a local HTTP server.

mod support;

use std::time::Duration;

use airlift_client::{ClientError, DownloadRequest, Downloader};
use airlift_store::{BundleStatus, BundleStore};
use axum::{Router, routing::get};
use support::{serve, sha256_hex, zip_bytes};

fn open_store(dir: &std::path::Path) -> BundleStore {
    BundleStore::open(dir.join("data"), dir.join("public")).unwrap()
}

fn request(addr: std::net::SocketAddr, version: &str, checksum: Option<String>) -> DownloadRequest {
    DownloadRequest {
        url: format!("http://{}/bundle.zip", addr),
        version_name: version.to_string(),
        session_key: None,
        expected_checksum: checksum,
    }
}

#[tokio::test]
async fn test_download_publishes_verified_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let archive = zip_bytes(&[("index.html", "<html>v1.1.0</html>"), ("app.js", "boot()")]);
    let checksum = sha256_hex(&archive);
    let app = Router::new().route("/bundle.zip", get(move || async move { archive.clone() }));
    let addr = serve(app).await;

    let downloader = Downloader::new(Duration::from_secs(5)).unwrap();
    let mut progress = vec![];
    let bundle = downloader
        .download(
            &store,
            &request(addr, "1.1.0", Some(checksum.clone())),
            |percent, _| progress.push(percent),
        )
        .await
        .unwrap();

    assert_eq!(bundle.status, BundleStatus::Success);
    assert_eq!(bundle.version_name, "1.1.0");
    assert_eq!(bundle.checksum, checksum);
    assert!(bundle.downloaded_at.is_some());

    let payload = store.bundle_dir(&bundle.id);
    assert!(payload.join("index.html").is_file());
    assert!(payload.join("app.js").is_file());

    // Progress is monotonic, starts at 0 and finishes at 100.
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));

    // No staging leftovers.
    assert_eq!(std::fs::read_dir(store.staging_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_single_directory_archives_are_unwrapped() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let archive = zip_bytes(&[("dist/index.html", "<html>"), ("dist/assets/app.js", "js")]);
    let app = Router::new().route("/bundle.zip", get(move || async move { archive.clone() }));
    let addr = serve(app).await;

    let downloader = Downloader::new(Duration::from_secs(5)).unwrap();
    let bundle = downloader
        .download(&store, &request(addr, "1.2.0", None), |_, _| {})
        .await
        .unwrap();

    let payload = store.bundle_dir(&bundle.id);
    assert!(payload.join("index.html").is_file());
    assert!(payload.join("assets/app.js").is_file());
}

#[tokio::test]
async fn test_checksum_mismatch_leaves_no_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let archive = zip_bytes(&[("index.html", "<html>")]);
    let app = Router::new().route("/bundle.zip", get(move || async move { archive.clone() }));
    let addr = serve(app).await;

    let downloader = Downloader::new(Duration::from_secs(5)).unwrap();
    let err = downloader
        .download(
            &store,
            &request(addr, "1.1.0", Some("abc".to_string())),
            |_, _| {},
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ChecksumMismatch { .. }));

    let entry = store.get_by_version("1.1.0").unwrap();
    assert_eq!(entry.status, BundleStatus::Error);
    assert!(!store.bundle_dir(&entry.id).exists());
    assert_eq!(std::fs::read_dir(store.staging_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_entry_point_is_structure_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let archive = zip_bytes(&[("main.js", "js"), ("style.css", "css")]);
    let app = Router::new().route("/bundle.zip", get(move || async move { archive.clone() }));
    let addr = serve(app).await;

    let downloader = Downloader::new(Duration::from_secs(5)).unwrap();
    let err = downloader
        .download(&store, &request(addr, "1.1.0", None), |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::StructureInvalid(_)));
    let entry = store.get_by_version("1.1.0").unwrap();
    assert!(!store.bundle_dir(&entry.id).exists());
}

#[tokio::test]
async fn test_corrupt_archive_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let app = Router::new().route(
        "/bundle.zip",
        get(|| async { b"definitely not a zip".to_vec() }),
    );
    let addr = serve(app).await;

    let downloader = Downloader::new(Duration::from_secs(5)).unwrap();
    let err = downloader
        .download(&store, &request(addr, "1.1.0", None), |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ArchiveCorrupt(_)));
}

#[tokio::test]
async fn test_duplicate_version_fails_before_any_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path());

    let archive = zip_bytes(&[("index.html", "<html>")]);
    let app = Router::new().route("/bundle.zip", get(move || async move { archive.clone() }));
    let addr = serve(app).await;

    let downloader = Downloader::new(Duration::from_secs(5)).unwrap();
    downloader
        .download(&store, &request(addr, "1.1.0", None), |_, _| {})
        .await
        .unwrap();

    let err = downloader
        .download(&store, &request(addr, "1.1.0", None), |_, _| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Store(airlift_store::StoreError::DuplicateVersion { .. })
    ));
}
