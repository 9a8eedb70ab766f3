//! Update orchestrator for runtime bundle replacement.
//!
//! Polls a metadata endpoint for new bundle versions, downloads and
//! verifies them, and switches the active bundle either immediately or at
//! the next restart. A readiness watchdog rolls back any bundle that never
//! confirms a successful boot, so the device always has a working payload
//! to fall back to.

mod config;
mod error;
mod events;
mod platform;
mod updater;

pub use config::UpdaterConfig;
pub use error::{UpdaterError, UpdaterResult};
pub use events::UpdaterEvent;
pub use platform::{
    ExecutionExtender, ExecutionToken, HostBridge, NoopBridge, UnboundedExecution,
};
pub use updater::{PLUGIN_VERSION, Updater, UpdaterBuilder};
