//! Capability seams to the host platform.
//!
//! The updater itself is platform-neutral; loading web content and
//! extending background execution windows are host concerns injected
//! through these traits.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Loads web content from a directory on behalf of the updater.
pub trait HostBridge: Send + Sync {
    /// Point the content view at `path` and reload it.
    fn reload(&self, path: &Path, using_builtin: bool);
}

/// Bridge for headless hosts and tests.
pub struct NoopBridge;

impl HostBridge for NoopBridge {
    fn reload(&self, path: &Path, using_builtin: bool) {
        debug!(
            "Reload requested: {} (builtin: {})",
            path.display(),
            using_builtin
        );
    }
}

/// Handle for one granted background-execution window.
pub struct ExecutionToken {
    id: u64,
    expiry: CancellationToken,
}

impl ExecutionToken {
    pub fn new(id: u64, expiry: CancellationToken) -> Self {
        Self { id, expiry }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Resolves when the platform revokes the execution window. The
    /// orchestrator truncates its in-flight cycle as a failure then.
    pub async fn expired(&self) {
        self.expiry.cancelled().await
    }
}

/// Platform background-execution extension.
pub trait ExecutionExtender: Send + Sync {
    fn begin(&self) -> ExecutionToken;
    fn end(&self, token: ExecutionToken);
}

/// Extender for platforms without execution limits: the window never
/// expires.
pub struct UnboundedExecution;

impl ExecutionExtender for UnboundedExecution {
    fn begin(&self) -> ExecutionToken {
        ExecutionToken::new(0, CancellationToken::new())
    }

    fn end(&self, _token: ExecutionToken) {}
}
