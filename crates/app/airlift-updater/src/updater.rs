//! Update orchestrator: trigger handling, the download/activation cycle,
//! and the readiness watchdog that guarantees a broken bundle can never
//! strand the device.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use airlift_client::{ClientError, DeviceInfo, DownloadRequest, Downloader, UpdateClient};
use airlift_store::{BundleInfo, BundleStatus, BundleStore, ScalarStore};
use parking_lot::Mutex;
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    config::UpdaterConfig,
    error::{UpdaterError, UpdaterResult},
    events::UpdaterEvent,
    platform::{ExecutionExtender, HostBridge, NoopBridge, UnboundedExecution},
};

/// Version reported to the update server as `plugin_version`.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEVICE_ID_KEY: &str = "device_id";
const NATIVE_VERSION_KEY: &str = "native_version";
const DELAY_UPDATE_KEY: &str = "delay_update";
const EVENT_CAPACITY: usize = 64;

/// Run-to-completion guard state. A cycle past Idle ignores new triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CyclePhase {
    Idle,
    Checking,
    Downloading,
}

pub struct UpdaterBuilder {
    config: UpdaterConfig,
    data_dir: Option<PathBuf>,
    builtin_dir: Option<PathBuf>,
    bridge: Arc<dyn HostBridge>,
    extender: Arc<dyn ExecutionExtender>,
}

impl UpdaterBuilder {
    pub fn new() -> Self {
        Self {
            config: UpdaterConfig::default(),
            data_dir: None,
            builtin_dir: None,
            bridge: Arc::new(NoopBridge),
            extender: Arc::new(UnboundedExecution),
        }
    }

    pub fn with_config(mut self, config: UpdaterConfig) -> Self {
        self.config = config;
        self
    }

    /// Root directory for the catalog, payloads and scalar storage.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Directory of the payload shipped inside the application package.
    pub fn with_builtin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.builtin_dir = Some(dir.into());
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn HostBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_extender(mut self, extender: Arc<dyn ExecutionExtender>) -> Self {
        self.extender = extender;
        self
    }

    pub fn build(self) -> UpdaterResult<Updater> {
        self.config.validate()?;

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|dir| dir.join("airlift"))
                .ok_or_else(|| {
                    UpdaterError::InvalidConfig("no data directory available".to_string())
                })?,
        };
        let builtin_dir = self.builtin_dir.unwrap_or_else(|| data_dir.join("public"));

        let store = BundleStore::open(&data_dir, &builtin_dir)?;
        let scalars = ScalarStore::new(data_dir.join("kv"));

        let device_id = match scalars.read(DEVICE_ID_KEY)? {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = Uuid::new_v4().to_string();
                scalars.write(DEVICE_ID_KEY, &id)?;
                id
            }
        };

        let client = UpdateClient::new(
            nonempty(&self.config.auto_update_url),
            nonempty(&self.config.stats_url),
            self.config.response_timeout,
        )?;
        let downloader = Downloader::new(self.config.response_timeout)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Updater {
            inner: Arc::new(Inner {
                config: self.config,
                store,
                scalars,
                client,
                downloader,
                bridge: self.bridge,
                extender: self.extender,
                events,
                device_id,
                phase: Mutex::new(CyclePhase::Idle),
                skip_next_tick: AtomicBool::new(false),
                active_downloads: AtomicUsize::new(0),
                shutdown: CancellationToken::new(),
                watchdog: Mutex::new(None),
                timer: Mutex::new(None),
            }),
        })
    }
}

impl Default for UpdaterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    config: UpdaterConfig,
    store: BundleStore,
    scalars: ScalarStore,
    client: UpdateClient,
    downloader: Downloader,
    bridge: Arc<dyn HostBridge>,
    extender: Arc<dyn ExecutionExtender>,
    events: broadcast::Sender<UpdaterEvent>,
    device_id: String,
    phase: Mutex<CyclePhase>,
    skip_next_tick: AtomicBool,
    active_downloads: AtomicUsize,
    shutdown: CancellationToken,
    watchdog: Mutex<Option<JoinHandle<()>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// The update orchestrator. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Updater {
    inner: Arc<Inner>,
}

impl Updater {
    pub fn builder() -> UpdaterBuilder {
        UpdaterBuilder::new()
    }

    /// Process-start hook.
    ///
    /// Runs the native-version cleanup, applies a bundle armed for this
    /// restart, arms the readiness watchdog around the active bundle, and
    /// kicks off the periodic checker plus an immediate check when auto
    /// update is enabled.
    pub async fn start(&self) -> UpdaterResult<()> {
        if self.inner.config.reset_when_update {
            self.cleanup_obsolete_versions();
        }
        self.apply_armed_next();
        self.arm_watchdog();
        self.spawn_timer();

        if self.inner.config.is_auto_update_enabled() {
            let updater = self.clone();
            tokio::spawn(async move { updater.run_cycle().await });
        }
        Ok(())
    }

    /// App-moved-to-foreground hook. Cancels the pending periodic tick for
    /// this period (an in-flight download is never aborted) and triggers a
    /// fresh check.
    pub fn on_foreground(&self) {
        if self.inner.config.is_auto_update_enabled() {
            self.inner.skip_next_tick.store(true, Ordering::SeqCst);
            let updater = self.clone();
            tokio::spawn(async move { updater.run_cycle().await });
        }
        self.arm_watchdog();
    }

    /// App-moved-to-background hook: the restart boundary at which an armed
    /// bundle is applied, or an unconfirmed one is rolled back.
    pub async fn on_background(&self) {
        match self.inner.scalars.read(DELAY_UPDATE_KEY) {
            Ok(Some(flag)) if flag == "true" => {
                let _ = self.inner.scalars.write(DELAY_UPDATE_KEY, "false");
                info!("Update delayed to next backgrounding");
                return;
            }
            _ => {}
        }

        let current = self.inner.store.current();
        if let Some(next) = self.inner.store.next() {
            if !next.is_error_status() && next.id != current.id {
                match self.inner.store.activate(&next.id) {
                    Ok(installed) => {
                        let _ = self.inner.store.clear_next();
                        info!("Updated to bundle {}", installed);
                        self.reload_content();
                    }
                    Err(err) => error!("Update to bundle {} failed: {}", next, err),
                }
                return;
            }
        }

        if !current.is_builtin() && self.inner.store.fallback().id != current.id {
            warn!(
                "App backgrounded before readiness was confirmed; rolling back {}",
                current
            );
            self.fail_current_bundle(current).await;
        }
    }

    /// Run one full update cycle now. Overlapping calls are ignored while a
    /// cycle is in flight.
    pub async fn check_for_update(&self) {
        self.run_cycle().await;
    }

    /// Manual download of a bundle archive; no activation decision is made.
    pub async fn download(&self, url: &str, version: Option<&str>) -> UpdaterResult<BundleInfo> {
        let version_name = match version {
            Some(version) => version.to_string(),
            None => {
                let mut generated = Uuid::new_v4().simple().to_string();
                generated.truncate(10);
                generated
            }
        };

        info!("Downloading {}", url);
        let request = DownloadRequest {
            url: url.to_string(),
            version_name,
            session_key: None,
            expected_checksum: None,
        };
        let events = self.inner.events.clone();
        self.inner.active_downloads.fetch_add(1, Ordering::SeqCst);
        let result = self
            .inner
            .downloader
            .download(&self.inner.store, &request, |percent, bundle| {
                let _ = events.send(UpdaterEvent::Download {
                    percent,
                    bundle: bundle.clone(),
                });
            })
            .await;
        self.inner.active_downloads.fetch_sub(1, Ordering::SeqCst);
        Ok(result?)
    }

    /// Arm `id` to become current at the next restart.
    pub fn next(&self, id: &str) -> UpdaterResult<BundleInfo> {
        info!("Setting next active bundle {}", id);
        Ok(self.inner.store.set_next(id)?)
    }

    /// Make `id` current immediately and reload the host content view.
    pub fn set(&self, id: &str) -> UpdaterResult<BundleInfo> {
        info!("Setting active bundle {}", id);
        let bundle = self.inner.store.activate(id)?;
        self.reload_content();
        Ok(bundle)
    }

    pub fn delete(&self, id: &str) -> UpdaterResult<bool> {
        info!("Deleting bundle {}", id);
        Ok(self.inner.store.delete(id, false)?)
    }

    pub fn list(&self) -> Vec<BundleInfo> {
        self.inner.store.list()
    }

    /// Hard reset: builtin, or the last bundle that passed readiness.
    pub fn reset(&self, to_last_successful: bool) -> UpdaterResult<BundleInfo> {
        let bundle = self.inner.store.reset(to_last_successful)?;
        self.reload_content();
        Ok(bundle)
    }

    /// The active bundle plus the native application version.
    pub fn current(&self) -> (BundleInfo, String) {
        (
            self.inner.store.current(),
            self.inner.config.version_build.clone(),
        )
    }

    pub fn reload(&self) {
        self.reload_content();
    }

    /// Skip the next restart-hook application of an armed bundle.
    pub fn set_delay(&self, delay: bool) -> UpdaterResult<()> {
        self.inner
            .scalars
            .write(DELAY_UPDATE_KEY, if delay { "true" } else { "false" })?;
        Ok(())
    }

    /// Confirmation from the embedding application that the active bundle
    /// booted successfully. Disarms the watchdog and makes the bundle the
    /// new rollback target.
    pub fn notify_app_ready(&self) -> UpdaterResult<BundleInfo> {
        if let Some(handle) = self.inner.watchdog.lock().take() {
            handle.abort();
        }

        let current = self.inner.store.current();
        info!("Current bundle loaded successfully: {}", current);
        let previous = self.inner.store.fallback();
        let committed = self.inner.store.commit(&current.id)?;

        if self.inner.config.auto_delete_previous
            && !committed.is_builtin()
            && !previous.is_builtin()
            && previous.id != committed.id
        {
            match self.inner.store.delete(&previous.id, false) {
                Ok(true) => info!("Deleted previous bundle {}", previous),
                Ok(false) => {}
                Err(err) => error!("Failed to delete previous bundle {}: {}", previous, err),
            }
        }
        Ok(committed)
    }

    /// Stable identifier of this device, generated once and persisted.
    pub fn get_id(&self) -> &str {
        &self.inner.device_id
    }

    pub fn get_plugin_version(&self) -> &'static str {
        PLUGIN_VERSION
    }

    pub fn is_auto_update_enabled(&self) -> bool {
        self.inner.config.is_auto_update_enabled()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdaterEvent> {
        self.inner.events.subscribe()
    }

    pub fn store(&self) -> &BundleStore {
        &self.inner.store
    }

    /// Cancel the periodic checker, the watchdog, and any in-flight cycle.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        if let Some(handle) = self.inner.timer.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.inner.watchdog.lock().take() {
            handle.abort();
        }
    }

    /// Wipe everything when the native application shell changed: bundles
    /// built against the old shell may be binary-incompatible.
    fn cleanup_obsolete_versions(&self) {
        let current_native = self.inner.config.version_build.clone();

        match self.inner.scalars.read(NATIVE_VERSION_KEY) {
            Ok(Some(previous)) if native_version_changed(&previous, &current_native) => {
                info!("New native version detected: {}", current_native);
                if let Err(err) = self.inner.store.reset(false) {
                    error!("Reset to builtin failed: {}", err);
                }
                for bundle in self.inner.store.list() {
                    info!("Deleting obsolete bundle: {}", bundle.id);
                    if let Err(err) = self.inner.store.delete(&bundle.id, true) {
                        error!("Failed to delete {}: {}", bundle.id, err);
                    }
                }
            }
            Ok(_) => {}
            Err(err) => error!("Could not read last-seen native version: {}", err),
        }

        if let Err(err) = self
            .inner
            .scalars
            .write(NATIVE_VERSION_KEY, &current_native)
        {
            error!("Could not persist native version: {}", err);
        }
    }

    /// Restart half of the deferred-activation contract: a healthy armed
    /// bundle becomes current before anything else runs this launch.
    fn apply_armed_next(&self) {
        let Some(next) = self.inner.store.next() else {
            return;
        };
        let current = self.inner.store.current();
        if next.is_error_status() || next.id == current.id {
            let _ = self.inner.store.clear_next();
            return;
        }

        info!("Applying armed bundle {} at restart", next);
        match self.inner.store.activate(&next.id) {
            Ok(_) => {
                let _ = self.inner.store.clear_next();
            }
            Err(err) => {
                error!("Failed to apply armed bundle {}: {}", next, err);
                let _ = self.inner.store.clear_next();
            }
        }
    }

    fn reload_content(&self) {
        let path = self.inner.store.current_bundle_path();
        let using_builtin = self.inner.store.is_using_builtin();
        info!("Reloading content from {}", path.display());
        self.inner.bridge.reload(&path, using_builtin);
        let _ = self.inner.events.send(UpdaterEvent::AppReloadRequested {
            path,
            using_builtin,
        });
        self.arm_watchdog();
    }

    /// Arm the readiness deadline around the active bundle. Re-arming
    /// cancels the previous deadline; a builtin current disarms entirely.
    fn arm_watchdog(&self) {
        let current = self.inner.store.current();
        let mut slot = self.inner.watchdog.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        if current.is_builtin() {
            debug!("Builtin bundle is active; watchdog disarmed");
            return;
        }

        let deadline = self.inner.config.app_ready_timeout;
        let updater = self.clone();
        *slot = Some(tokio::spawn(async move {
            info!(
                "Waiting {:?} for app-ready confirmation of {}",
                deadline, current
            );
            tokio::select! {
                _ = updater.inner.shutdown.cancelled() => return,
                _ = tokio::time::sleep(deadline) => {}
            }
            updater.watchdog_expired(current).await;
        }));
    }

    async fn watchdog_expired(&self, armed: BundleInfo) {
        let current = self.inner.store.current();
        if current.is_builtin() || current.id != armed.id {
            return;
        }
        if self.inner.store.fallback().id == current.id {
            debug!("App-ready already confirmed for {}", current);
            return;
        }

        error!(
            "App-ready was never confirmed within {:?}; rolling back {}",
            self.inner.config.app_ready_timeout, current
        );
        self.fail_current_bundle(current).await;
    }

    /// Roll the active bundle back to the fallback (or builtin), report it,
    /// and optionally delete the failure.
    async fn fail_current_bundle(&self, current: BundleInfo) {
        let _ = self.inner.store.rollback(&current.id);
        let info = self.device_info(&current);
        self.inner
            .client
            .send_stats(&info, "revert", &current.version_name)
            .await;
        let _ = self.inner.events.send(UpdaterEvent::UpdateFailed {
            bundle: current.clone(),
        });

        match self.inner.store.reset(true) {
            Ok(target) => info!("Rolled back to {}", target),
            Err(err) => error!("Rollback reset failed: {}", err),
        }
        self.reload_content();

        if self.inner.config.auto_delete_failed {
            match self.inner.store.delete(&current.id, false) {
                Ok(true) => info!("Deleted failed bundle {}", current),
                Ok(false) => {}
                Err(err) => error!("Failed to delete bundle {}: {}", current, err),
            }
        }
    }

    fn begin_cycle(&self) -> bool {
        let mut phase = self.inner.phase.lock();
        if *phase != CyclePhase::Idle {
            return false;
        }
        *phase = CyclePhase::Checking;
        true
    }

    fn set_phase(&self, phase: CyclePhase) {
        *self.inner.phase.lock() = phase;
    }

    async fn run_cycle(&self) {
        if !self.begin_cycle() {
            debug!("Update cycle already in flight; ignoring trigger");
            return;
        }
        let _guard = CycleGuard(self.clone());

        let token = self.inner.extender.begin();
        tokio::select! {
            _ = self.inner.shutdown.cancelled() => debug!("Shutdown during update cycle"),
            _ = token.expired() => warn!("Execution window expired; truncating update cycle"),
            _ = self.cycle_inner() => {}
        }
        self.inner.extender.end(token);
    }

    /// Purge entries a truncated cycle left mid-download. Skipped while a
    /// manual download is active, so its entry is never clobbered.
    fn sweep_stalled_downloads(&self) {
        if self.inner.active_downloads.load(Ordering::SeqCst) != 0 {
            return;
        }
        for bundle in self.inner.store.list() {
            if matches!(
                bundle.status,
                BundleStatus::Pending | BundleStatus::Downloading
            ) {
                warn!("Sweeping stalled download {}", bundle);
                let _ = self.inner.store.delete(&bundle.id, true);
            }
        }
    }

    async fn cycle_inner(&self) {
        self.sweep_stalled_downloads();

        let current = self.inner.store.current();
        let info = self.device_info(&current);

        let res = match self.inner.client.check_latest(&info).await {
            Ok(res) => res,
            Err(err) => {
                debug!("Update check failed: {}; will retry next cycle", err);
                return;
            }
        };

        if let Some(error) = &res.error {
            warn!(
                "Update endpoint error: {} ({})",
                error,
                res.message.as_deref().unwrap_or("no message")
            );
            return;
        }
        if let Some(message) = &res.message {
            info!("Update endpoint message: {}", message);
            if res.major && !res.version.is_empty() {
                let _ = self.inner.events.send(UpdaterEvent::MajorAvailable {
                    version: res.version.clone(),
                });
            }
            return;
        }
        if !res.has_update_candidate() || Url::parse(&res.url).is_err() {
            debug!("No update available");
            return;
        }
        if res.version == current.version_name {
            debug!("{} is already the latest bundle", current);
            return;
        }

        if let Some(existing) = self.inner.store.get_by_version(&res.version) {
            if existing.is_error_status() {
                warn!(
                    "Bundle {} already exists in error state; aborting update",
                    existing
                );
                return;
            }
            if existing.is_downloaded() {
                info!("Bundle {} already downloaded; skipping fetch", existing);
                self.apply_update(existing, &info).await;
                return;
            }
            if existing.is_deleted() {
                info!("Purging deleted bundle record for {}", res.version);
                if let Err(err) = self.inner.store.delete(&existing.id, true) {
                    error!("Failed to purge {}: {}", existing.id, err);
                    return;
                }
            } else {
                // Pending/Downloading from a concurrent manual download.
                warn!("Bundle {} is busy; skipping this cycle", existing);
                return;
            }
        }

        info!(
            "New bundle {} found, current is {}",
            res.version, current.version_name
        );
        self.set_phase(CyclePhase::Downloading);

        let request = DownloadRequest {
            url: res.url.clone(),
            version_name: res.version.clone(),
            session_key: res.session_key.clone(),
            expected_checksum: (!res.checksum.is_empty()).then(|| res.checksum.clone()),
        };
        let events = self.inner.events.clone();
        let downloaded = self
            .inner
            .downloader
            .download(&self.inner.store, &request, |percent, bundle| {
                let _ = events.send(UpdaterEvent::Download {
                    percent,
                    bundle: bundle.clone(),
                });
            })
            .await;

        let bundle = match downloaded {
            Ok(bundle) => bundle,
            Err(err) => {
                let action = if matches!(err, ClientError::ChecksumMismatch { .. }) {
                    "checksum_fail"
                } else {
                    "download_fail"
                };
                error!("Bundle download failed: {}", err);
                self.inner.client.send_stats(&info, action, &res.version).await;
                if let Some(failed) = self.inner.store.get_by_version(&res.version) {
                    let _ = self.inner.events.send(UpdaterEvent::UpdateFailed {
                        bundle: failed.clone(),
                    });
                    let _ = self.inner.store.delete(&failed.id, true);
                }
                return;
            }
        };

        // Redundant verification layered on top of the downloader's own
        // check; covers servers that rotate artifacts mid-cycle.
        if !res.checksum.is_empty() && !bundle.checksum.eq_ignore_ascii_case(&res.checksum) {
            error!("Checksum mismatch for bundle {}", bundle);
            self.inner
                .client
                .send_stats(&info, "checksum_fail", &bundle.version_name)
                .await;
            let _ = self.inner.events.send(UpdaterEvent::UpdateFailed {
                bundle: bundle.clone(),
            });
            let _ = self.inner.store.delete(&bundle.id, true);
            return;
        }

        self.apply_update(bundle, &info).await;
    }

    /// Activation decision: immediate install or arm for the next restart.
    async fn apply_update(&self, bundle: BundleInfo, info: &DeviceInfo) {
        if self.inner.config.direct_update {
            match self.inner.store.activate(&bundle.id) {
                Ok(active) => {
                    self.inner
                        .client
                        .send_stats(info, "set", &active.version_name)
                        .await;
                    info!("Updated to bundle {}", active);
                    self.reload_content();
                }
                Err(err) => {
                    error!("Failed to activate bundle {}: {}", bundle, err);
                    let _ = self
                        .inner
                        .events
                        .send(UpdaterEvent::UpdateFailed { bundle });
                }
            }
        } else {
            match self.inner.store.set_next(&bundle.id) {
                Ok(next) => {
                    info!("Bundle {} will be applied at next restart", next);
                    let _ = self
                        .inner
                        .events
                        .send(UpdaterEvent::UpdateAvailable { bundle: next });
                }
                Err(err) => error!("Failed to arm bundle {}: {}", bundle, err),
            }
        }
    }

    fn device_info(&self, current: &BundleInfo) -> DeviceInfo {
        let config = &self.inner.config;
        DeviceInfo {
            platform: config.platform.clone(),
            device_id: self.inner.device_id.clone(),
            app_id: config.app_id.clone(),
            custom_id: config.custom_id.clone(),
            version_build: config.version_build.clone(),
            version_code: config.version_code.clone(),
            version_os: config.version_os.clone(),
            version_name: current.version_name.clone(),
            plugin_version: PLUGIN_VERSION.to_string(),
            is_emulator: config.is_emulator,
            is_prod: config.is_prod,
            action: None,
            channel: config.channel.clone(),
            default_channel: config.default_channel.clone(),
        }
    }

    /// Periodic checker. The foreground hook can skip one pending tick; an
    /// in-flight cycle is never aborted by the timer.
    fn spawn_timer(&self) {
        if !self.inner.config.is_auto_update_enabled() {
            return;
        }
        let period = self.inner.config.period_check_delay;
        if period.is_zero() {
            return;
        }

        let updater = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; the start hook already
            // runs an initial check.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = updater.inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if updater.inner.skip_next_tick.swap(false, Ordering::SeqCst) {
                            debug!("Skipping periodic check; foreground already triggered one");
                            continue;
                        }
                        updater.run_cycle().await;
                    }
                }
            }
        });
        *self.inner.timer.lock() = Some(handle);
    }
}

/// Releases the run-to-completion guard even when a cycle is truncated.
struct CycleGuard(Updater);

impl Drop for CycleGuard {
    fn drop(&mut self) {
        *self.0.inner.phase.lock() = CyclePhase::Idle;
    }
}

fn nonempty(raw: &str) -> Option<&str> {
    if raw.is_empty() { None } else { Some(raw) }
}

fn native_version_changed(previous: &str, current: &str) -> bool {
    if previous.is_empty() {
        return false;
    }
    match (
        semver::Version::parse(previous),
        semver::Version::parse(current),
    ) {
        (Ok(previous), Ok(current)) => previous != current,
        _ => previous != current,
    }
}
