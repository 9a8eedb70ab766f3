//! Shared fixtures: a fake update server and catalog helpers.

use std::{
    io::Write,
    net::SocketAddr,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use airlift_store::{BundleInfo, BundleStore};
use airlift_updater::{Updater, UpdaterConfig, UpdaterEvent};
use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use zip::write::SimpleFileOptions;

/// Build an in-memory zip archive from `(path, contents)` pairs.
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::Digest;
    hex::encode(sha2::Sha256::digest(bytes))
}

/// Fake update/stats/archive server with hit counters.
pub struct Remote {
    pub addr: SocketAddr,
    pub stats: Arc<Mutex<Vec<Value>>>,
    pub update_hits: Arc<AtomicUsize>,
    pub archive_hits: Arc<AtomicUsize>,
}

impl Remote {
    pub fn stats_actions(&self) -> Vec<String> {
        self.stats
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| event["action"].as_str().map(str::to_string))
            .collect()
    }
}

/// Serve an update response on `/updates`, `archive` on `/bundle.zip` and
/// record `/stats` posts. The response is built from the bound address so
/// it can point back at `/bundle.zip`. `update_delay` throttles the updates
/// endpoint so tests can overlap cycles.
pub async fn remote_with_delay(
    make_response: impl FnOnce(SocketAddr) -> Value,
    archive: Vec<u8>,
    update_delay: Duration,
) -> Remote {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = make_response(addr);

    let stats: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(vec![]));
    let update_hits = Arc::new(AtomicUsize::new(0));
    let archive_hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/updates", {
            let hits = update_hits.clone();
            post(move |_: Json<Value>| {
                let response = response.clone();
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(update_delay).await;
                    Json(response)
                }
            })
        })
        .route("/bundle.zip", {
            let hits = archive_hits.clone();
            get(move || {
                let archive = archive.clone();
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    archive
                }
            })
        })
        .route("/stats", {
            let stats = stats.clone();
            post(move |Json(body): Json<Value>| {
                let stats = stats.clone();
                async move {
                    stats.lock().unwrap().push(body);
                    StatusCode::OK
                }
            })
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Remote {
        addr,
        stats,
        update_hits,
        archive_hits,
    }
}

pub async fn remote(make_response: impl FnOnce(SocketAddr) -> Value, archive: Vec<u8>) -> Remote {
    remote_with_delay(make_response, archive, Duration::ZERO).await
}

/// The standard "new version available" response pointing at the fixture
/// archive endpoint.
pub fn update_response(version: &str, checksum: &str) -> impl FnOnce(SocketAddr) -> Value {
    let version = version.to_string();
    let checksum = checksum.to_string();
    move |addr| {
        json!({
            "url": format!("http://{}/bundle.zip", addr),
            "version": version,
            "checksum": checksum,
        })
    }
}

/// Config pointing at the fake server, immediate installs, no timer.
pub fn remote_config(addr: SocketAddr) -> UpdaterConfig {
    UpdaterConfig {
        auto_update: true,
        auto_update_url: format!("http://{}/updates", addr),
        stats_url: format!("http://{}/stats", addr),
        direct_update: true,
        period_check_delay: Duration::ZERO,
        app_id: "app.example".to_string(),
        version_build: "2.0.0".to_string(),
        ..Default::default()
    }
}

/// Config with no endpoints at all, for offline lifecycle tests.
pub fn offline_config() -> UpdaterConfig {
    UpdaterConfig {
        app_id: "app.example".to_string(),
        version_build: "2.0.0".to_string(),
        ..Default::default()
    }
}

pub fn build_updater(dir: &Path, config: UpdaterConfig) -> Updater {
    Updater::builder()
        .with_config(config)
        .with_data_dir(dir.join("data"))
        .with_builtin_dir(dir.join("public"))
        .build()
        .unwrap()
}

/// Register, publish and verify a bundle directly in the store.
pub fn add_verified(store: &BundleStore, version: &str) -> BundleInfo {
    let info = store.register(version).unwrap();
    store.mark_downloading(&info.id).unwrap();
    let dir = store.bundle_dir(&info.id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<html>").unwrap();
    store.mark_verified(&info.id, "cafe").unwrap()
}

/// Collect everything currently buffered on an event receiver.
pub fn drain_events(
    rx: &mut tokio::sync::broadcast::Receiver<UpdaterEvent>,
) -> Vec<UpdaterEvent> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
