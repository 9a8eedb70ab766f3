//! Streaming bundle download: fetch, verify, extract, publish atomically.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use airlift_store::{BundleInfo, BundleStore};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};

const DEFAULT_ENTRY_POINT: &str = "index.html";

/// Everything needed to fetch one bundle archive.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub version_name: String,
    /// Opaque key handed through from the metadata response; payload
    /// decryption is outside this component's scope.
    pub session_key: Option<String>,
    /// Hex sha256 announced by the metadata endpoint. Verification is
    /// skipped only when the server supplied none.
    pub expected_checksum: Option<String>,
}

/// Fetches a bundle archive and turns it into a verified store entry.
///
/// Failure at any step leaves no partially-published payload: the archive
/// and staging intermediates are removed and the entry is marked failed.
/// Deleting the failed entry is the caller's decision.
pub struct Downloader {
    http: reqwest::Client,
    entry_point: String,
}

impl Downloader {
    pub fn new(connect_timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()?,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        })
    }

    /// Override the file that must exist at the extraction root.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Run the full pipeline. `on_progress` receives whole-percent steps
    /// from 0 to 100 together with the catalog entry being filled.
    pub async fn download<F>(
        &self,
        store: &BundleStore,
        request: &DownloadRequest,
        mut on_progress: F,
    ) -> ClientResult<BundleInfo>
    where
        F: FnMut(u8, &BundleInfo),
    {
        let url = Url::parse(&request.url)
            .map_err(|_| ClientError::InvalidUrl(request.url.clone()))?;
        let info = store.register(&request.version_name)?;

        match self
            .fetch_verify_publish(store, &url, request, &info, &mut on_progress)
            .await
        {
            Ok(checksum) => {
                let verified = store.mark_verified(&info.id, &checksum)?;
                on_progress(100, &verified);
                info!("Downloaded bundle {}", verified);
                Ok(verified)
            }
            Err(err) => {
                let _ = store.mark_failed(&info.id);
                Err(err)
            }
        }
    }

    async fn fetch_verify_publish<F>(
        &self,
        store: &BundleStore,
        url: &Url,
        request: &DownloadRequest,
        info: &BundleInfo,
        on_progress: &mut F,
    ) -> ClientResult<String>
    where
        F: FnMut(u8, &BundleInfo),
    {
        let archive_path = store.staging_dir().join(format!("{}.zip", info.id));
        let staging_dir = store.staging_dir().join(&info.id);

        let result = self
            .try_fetch(store, url, request, info, &archive_path, &staging_dir, on_progress)
            .await;

        // Intermediates never outlive the attempt; the published payload
        // directory is the only surviving artifact.
        let _ = tokio::fs::remove_file(&archive_path).await;
        let _ = airlift_fs::remove_dir_idempotent(&staging_dir);

        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn try_fetch<F>(
        &self,
        store: &BundleStore,
        url: &Url,
        request: &DownloadRequest,
        info: &BundleInfo,
        archive_path: &Path,
        staging_dir: &Path,
        on_progress: &mut F,
    ) -> ClientResult<String>
    where
        F: FnMut(u8, &BundleInfo),
    {
        store.mark_downloading(&info.id)?;
        on_progress(0, info);
        debug!("Fetching bundle {} from {}", request.version_name, url);

        let mut response = self.http.get(url.clone()).send().await?.error_for_status()?;
        let total = response.content_length().filter(|t| *t > 0);

        let mut file = tokio::fs::File::create(archive_path).await?;
        let mut hasher = Sha256::new();
        let mut received: u64 = 0;
        let mut last_percent: u8 = 0;

        while let Some(chunk) = response.chunk().await? {
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;

            if let Some(total) = total {
                // Hold 100 back until the payload is actually published.
                let percent = ((received.min(total) * 99) / total) as u8;
                if percent > last_percent {
                    last_percent = percent;
                    on_progress(percent, info);
                }
            }
        }
        file.flush().await?;
        drop(file);

        let actual = hex::encode(hasher.finalize());
        if let Some(expected) = request
            .expected_checksum
            .as_deref()
            .filter(|c| !c.is_empty())
        {
            if !expected.eq_ignore_ascii_case(&actual) {
                return Err(ClientError::ChecksumMismatch {
                    expected: expected.to_ascii_lowercase(),
                    actual,
                });
            }
        }
        if request.session_key.is_some() {
            debug!("Session key present for bundle {}", info.id);
        }

        let archive = archive_path.to_path_buf();
        let dest = staging_dir.to_path_buf();
        tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
            .await
            .map_err(std::io::Error::other)??;

        let payload_root = resolve_payload_root(staging_dir, &self.entry_point)?;
        let files = airlift_fs::list_files(&payload_root)
            .map_err(|err| ClientError::StructureInvalid(err.to_string()))?;
        debug!("Extracted {} files for bundle {}", files.len(), info.id);

        airlift_fs::publish_dir(&payload_root, store.bundle_dir(&info.id))?;
        Ok(actual)
    }
}

fn extract_archive(archive_path: &Path, dest: &Path) -> ClientResult<()> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|err| ClientError::ArchiveCorrupt(err.to_string()))?;
    if archive.len() == 0 {
        return Err(ClientError::ArchiveCorrupt("archive is empty".to_string()));
    }
    archive
        .extract(dest)
        .map_err(|err| ClientError::ArchiveCorrupt(err.to_string()))
}

/// Locate the directory holding the entry-point file.
///
/// Accepts archives with files at the root as well as archives wrapping
/// everything in a single top-level directory.
fn resolve_payload_root(dir: &Path, entry_point: &str) -> ClientResult<PathBuf> {
    if dir.join(entry_point).is_file() {
        return Ok(dir.to_path_buf());
    }

    let children: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    if let [only] = children.as_slice() {
        if only.is_dir() && only.join(entry_point).is_file() {
            return Ok(only.clone());
        }
    }

    Err(ClientError::StructureInvalid(format!(
        "no {} at bundle root",
        entry_point
    )))
}
