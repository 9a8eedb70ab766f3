//! Persistent bundle catalog with atomic state transitions.
//!
//! The catalog is the only shared mutable resource in the system: every
//! writer goes through the transition API below, guarded by one lock, and
//! the manifest is rewritten atomically on each mutation. Payload
//! directories appear only via a staged rename, so a reader never observes
//! a half-published bundle.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    bundle::{BUILTIN_ID, BundleInfo, BundleStatus},
    error::{StoreError, StoreResult},
};

const MANIFEST_FILE: &str = "catalog.json";
const BUNDLES_DIR: &str = "bundles";
const STAGING_DIR: &str = "staging";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Catalog {
    entries: BTreeMap<String, BundleInfo>,
    /// Active bundle id; `None` means builtin.
    current: Option<String>,
    /// Bundle armed to become current at the next restart.
    next: Option<String>,
    /// Last bundle that passed the readiness check.
    fallback: Option<String>,
}

/// Catalog of known bundles plus the pointers to the active/next one.
pub struct BundleStore {
    root: PathBuf,
    builtin_path: PathBuf,
    manifest_path: PathBuf,
    inner: Mutex<Catalog>,
}

impl BundleStore {
    /// Open (or initialize) the catalog rooted at `root`.
    ///
    /// `builtin_path` is the directory of the payload shipped with the
    /// application package. Entries left in Pending/Downloading state by an
    /// interrupted run are swept away here, along with any staging leftovers.
    pub fn open(root: impl Into<PathBuf>, builtin_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);

        for dir in [root.join(BUNDLES_DIR), root.join(STAGING_DIR)] {
            fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
                path: dir.clone(),
                source,
            })?;
        }

        let catalog = if manifest_path.exists() {
            let raw = fs::read_to_string(&manifest_path).map_err(|source| StoreError::Read {
                path: manifest_path.clone(),
                source,
            })?;
            serde_json::from_str(&raw)?
        } else {
            Catalog::default()
        };

        let store = Self {
            root,
            builtin_path: builtin_path.into(),
            manifest_path,
            inner: Mutex::new(catalog),
        };
        store.sweep_interrupted()?;
        Ok(store)
    }

    /// Remove entries an earlier process left mid-download.
    fn sweep_interrupted(&self) -> StoreResult<()> {
        let mut catalog = self.inner.lock();
        let stale: Vec<String> = catalog
            .entries
            .values()
            .filter(|b| matches!(b.status, BundleStatus::Pending | BundleStatus::Downloading))
            .map(|b| b.id.clone())
            .collect();

        for id in &stale {
            warn!("Sweeping interrupted download: {}", id);
            let _ = airlift_fs::remove_dir_idempotent(self.bundle_dir(id));
            catalog.entries.remove(id);
        }

        let staging = self.root.join(STAGING_DIR);
        if let Ok(leftovers) = fs::read_dir(&staging) {
            for entry in leftovers.flatten() {
                let _ = airlift_fs::remove_dir_idempotent(entry.path());
            }
        }

        if !stale.is_empty() {
            self.save(&catalog)?;
        }
        Ok(())
    }

    fn save(&self, catalog: &Catalog) -> StoreResult<()> {
        let raw = serde_json::to_vec_pretty(catalog)?;
        airlift_fs::write(&self.manifest_path, raw).map_err(|source| StoreError::Write {
            path: self.manifest_path.clone(),
            source,
        })
    }

    /// Create a Pending catalog entry for a new download.
    pub fn register(&self, version_name: &str) -> StoreResult<BundleInfo> {
        let mut catalog = self.inner.lock();

        if catalog
            .entries
            .values()
            .any(|b| b.version_name == version_name && !b.is_deleted())
        {
            return Err(StoreError::DuplicateVersion {
                version_name: version_name.to_string(),
            });
        }

        let info = BundleInfo::new(Uuid::new_v4().to_string(), version_name.to_string());
        debug!("Registered bundle {}", info);
        catalog.entries.insert(info.id.clone(), info.clone());
        self.save(&catalog)?;
        Ok(info)
    }

    pub fn mark_downloading(&self, id: &str) -> StoreResult<BundleInfo> {
        self.transition(id, |b| b.status = BundleStatus::Downloading)
    }

    /// Terminal transition out of Downloading: the payload passed checksum
    /// and structural validation and its directory has been published.
    pub fn mark_verified(&self, id: &str, checksum: &str) -> StoreResult<BundleInfo> {
        if !self.bundle_dir(id).is_dir() {
            return Err(StoreError::MissingPayload { id: id.to_string() });
        }
        self.transition(id, |b| {
            b.status = BundleStatus::Success;
            b.checksum = checksum.to_string();
            b.downloaded_at = Some(Utc::now());
        })
    }

    pub fn mark_failed(&self, id: &str) -> StoreResult<BundleInfo> {
        self.transition(id, |b| b.status = BundleStatus::Error)
    }

    fn transition(
        &self,
        id: &str,
        apply: impl FnOnce(&mut BundleInfo),
    ) -> StoreResult<BundleInfo> {
        let mut catalog = self.inner.lock();
        let entry = catalog
            .entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        apply(entry);
        let info = entry.clone();
        self.save(&catalog)?;
        debug!("Bundle transition: {}", info);
        Ok(info)
    }

    /// Make `id` the active bundle immediately.
    pub fn activate(&self, id: &str) -> StoreResult<BundleInfo> {
        let mut catalog = self.inner.lock();
        if id == BUILTIN_ID {
            catalog.current = None;
            self.save(&catalog)?;
            return Ok(BundleInfo::builtin());
        }

        let entry = catalog
            .entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        if !entry.is_downloaded() {
            return Err(StoreError::NotVerified { id: id.to_string() });
        }

        let info = entry.clone();
        catalog.current = Some(id.to_string());
        self.save(&catalog)?;
        info!("Active bundle is now {}", info);
        Ok(info)
    }

    /// Arm `id` to become current at the next restart. Never applied
    /// mid-session; the orchestrator owns the restart hook.
    pub fn set_next(&self, id: &str) -> StoreResult<BundleInfo> {
        let mut catalog = self.inner.lock();
        let entry = catalog
            .entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        if !entry.is_downloaded() {
            return Err(StoreError::NotVerified { id: id.to_string() });
        }

        let info = entry.clone();
        catalog.next = Some(id.to_string());
        self.save(&catalog)?;
        info!("Next bundle armed: {}", info);
        Ok(info)
    }

    pub fn clear_next(&self) -> StoreResult<()> {
        let mut catalog = self.inner.lock();
        catalog.next = None;
        self.save(&catalog)
    }

    /// Remove a bundle and its storage.
    ///
    /// Returns `Ok(false)` when `id` is unknown or already deleted. Refuses
    /// the builtin bundle always, and the current/next bundle unless
    /// `force`. A forced delete also purges the catalog record so the
    /// version name can be reused; an unforced delete leaves a tombstone.
    pub fn delete(&self, id: &str, force: bool) -> StoreResult<bool> {
        let mut catalog = self.inner.lock();

        if id == BUILTIN_ID {
            return Err(StoreError::Protected { id: id.to_string() });
        }
        let Some(entry) = catalog.entries.get(id) else {
            return Ok(false);
        };
        if entry.is_deleted() && !force {
            return Ok(false);
        }

        let is_current = catalog.current.as_deref() == Some(id);
        let is_next = catalog.next.as_deref() == Some(id);
        if (is_current || is_next) && !force {
            return Err(StoreError::Protected { id: id.to_string() });
        }

        airlift_fs::remove_dir_idempotent(self.bundle_dir(id)).map_err(|source| {
            StoreError::Write {
                path: self.bundle_dir(id),
                source,
            }
        })?;

        if force {
            catalog.entries.remove(id);
            if is_current {
                catalog.current = None;
            }
            if is_next {
                catalog.next = None;
            }
        } else if let Some(entry) = catalog.entries.get_mut(id) {
            entry.status = BundleStatus::Deleted;
        }
        if catalog.fallback.as_deref() == Some(id) {
            catalog.fallback = None;
        }

        self.save(&catalog)?;
        info!("Deleted bundle {}", id);
        Ok(true)
    }

    /// Downloaded bundles known to the catalog, excluding the builtin
    /// sentinel and deleted tombstones.
    pub fn list(&self) -> Vec<BundleInfo> {
        let catalog = self.inner.lock();
        catalog
            .entries
            .values()
            .filter(|b| !b.is_deleted())
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<BundleInfo> {
        if id == BUILTIN_ID {
            return Some(BundleInfo::builtin());
        }
        self.inner.lock().entries.get(id).cloned()
    }

    pub fn get_by_version(&self, version_name: &str) -> Option<BundleInfo> {
        let catalog = self.inner.lock();
        let mut candidates = catalog
            .entries
            .values()
            .filter(|b| b.version_name == version_name);
        // A live entry wins over a deleted tombstone with the same name.
        candidates
            .clone()
            .find(|b| !b.is_deleted())
            .or_else(|| candidates.next())
            .cloned()
    }

    /// The bundle the host currently loads content from.
    pub fn current(&self) -> BundleInfo {
        let catalog = self.inner.lock();
        catalog
            .current
            .as_ref()
            .and_then(|id| catalog.entries.get(id))
            .cloned()
            .unwrap_or_else(BundleInfo::builtin)
    }

    pub fn next(&self) -> Option<BundleInfo> {
        let catalog = self.inner.lock();
        catalog
            .next
            .as_ref()
            .and_then(|id| catalog.entries.get(id))
            .cloned()
    }

    /// Last bundle that passed the readiness check, or builtin if none.
    pub fn fallback(&self) -> BundleInfo {
        let catalog = self.inner.lock();
        catalog
            .fallback
            .as_ref()
            .and_then(|id| catalog.entries.get(id))
            .filter(|b| b.is_downloaded())
            .cloned()
            .unwrap_or_else(BundleInfo::builtin)
    }

    /// Record that `id` passed the readiness check and becomes the new
    /// rollback target of choice.
    pub fn commit(&self, id: &str) -> StoreResult<BundleInfo> {
        let mut catalog = self.inner.lock();
        if id == BUILTIN_ID {
            return Ok(BundleInfo::builtin());
        }
        let entry = catalog
            .entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        if !entry.is_downloaded() {
            return Err(StoreError::NotVerified { id: id.to_string() });
        }
        let info = entry.clone();
        catalog.fallback = Some(id.to_string());
        self.save(&catalog)?;
        info!("Committed bundle {} as fallback target", info);
        Ok(info)
    }

    /// Mark a bundle that failed to start as Error so it can never be
    /// activated again without a fresh download.
    pub fn rollback(&self, id: &str) -> StoreResult<BundleInfo> {
        self.transition(id, |b| b.status = BundleStatus::Error)
    }

    /// Hard reset of the activation state.
    ///
    /// With `to_last_successful` and a non-builtin fallback available, the
    /// fallback becomes current; otherwise builtin does. The next pointer is
    /// cleared either way.
    pub fn reset(&self, to_last_successful: bool) -> StoreResult<BundleInfo> {
        let target = if to_last_successful {
            self.fallback()
        } else {
            BundleInfo::builtin()
        };

        {
            let mut catalog = self.inner.lock();
            catalog.next = None;
            catalog.current = if target.is_builtin() {
                None
            } else {
                Some(target.id.clone())
            };
            self.save(&catalog)?;
        }
        info!("Reset active bundle to {}", target);
        Ok(target)
    }

    pub fn is_using_builtin(&self) -> bool {
        self.inner.lock().current.is_none()
    }

    /// Directory the host should serve content from right now.
    pub fn current_bundle_path(&self) -> PathBuf {
        let catalog = self.inner.lock();
        match catalog.current.as_ref() {
            Some(id) => self.bundle_dir(id),
            None => self.builtin_path.clone(),
        }
    }

    pub fn bundle_dir(&self, id: &str) -> PathBuf {
        if id == BUILTIN_ID {
            self.builtin_path.clone()
        } else {
            self.root.join(BUNDLES_DIR).join(id)
        }
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
