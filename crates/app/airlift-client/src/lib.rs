//! Network side of the bundle updater: latest-version metadata queries,
//! fire-and-forget stats reporting, and the streaming archive downloader.

mod client;
mod download;
mod error;
mod types;

pub use client::UpdateClient;
pub use download::{DownloadRequest, Downloader};
pub use error::{ClientError, ClientResult};
pub use types::{DeviceInfo, UpdateCheckResult};
