use std::path::PathBuf;

use airlift_store::BundleInfo;

/// Notifications delivered to the embedding application.
#[derive(Debug, Clone)]
pub enum UpdaterEvent {
    /// Download progress, 0–100 whole percent.
    Download { percent: u8, bundle: BundleInfo },
    /// The endpoint announced a new major version without offering it.
    MajorAvailable { version: String },
    /// A bundle is downloaded and armed for the next restart.
    UpdateAvailable { bundle: BundleInfo },
    /// A bundle failed to download, verify, or start.
    UpdateFailed { bundle: BundleInfo },
    /// The host content view should load from a new directory.
    AppReloadRequested {
        path: PathBuf,
        using_builtin: bool,
    },
}
