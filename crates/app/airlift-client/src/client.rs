//! HTTP client for the latest-version and stats endpoints.

use std::time::Duration;

use tracing::{debug, error, warn};
use url::Url;

use crate::{
    error::{ClientError, ClientResult},
    types::{DeviceInfo, UpdateCheckResult},
};

/// Client for the remote metadata endpoints.
///
/// `check_latest` is the single request/response exchange the orchestrator
/// polls with; `send_stats` is fire-and-forget reporting that is never
/// allowed to fail a cycle.
pub struct UpdateClient {
    http: reqwest::Client,
    latest_url: Option<Url>,
    stats_url: Option<Url>,
}

impl UpdateClient {
    pub fn new(
        latest_url: Option<&str>,
        stats_url: Option<&str>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let parse = |raw: Option<&str>| -> ClientResult<Option<Url>> {
            match raw.filter(|s| !s.is_empty()) {
                Some(raw) => Ok(Some(
                    Url::parse(raw).map_err(|_| ClientError::InvalidUrl(raw.to_string()))?,
                )),
                None => Ok(None),
            }
        };

        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            latest_url: parse(latest_url)?,
            stats_url: parse(stats_url)?,
        })
    }

    /// Query the latest-version endpoint.
    ///
    /// Transport failures surface as [`ClientError::Network`] (retryable
    /// next cycle). A reachable endpoint that answers non-2xx or with an
    /// undecodable body yields an `UpdateCheckResult` carrying
    /// `error = "response_error"` instead, which the caller treats as
    /// "no update available".
    pub async fn check_latest(&self, info: &DeviceInfo) -> ClientResult<UpdateCheckResult> {
        let Some(url) = &self.latest_url else {
            return Ok(UpdateCheckResult::response_error(
                "no update endpoint configured",
            ));
        };

        debug!("Checking for update via {}", url);
        let response = self.http.post(url.clone()).json(info).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Update endpoint answered {}", status);
            return Ok(UpdateCheckResult::response_error(format!(
                "update endpoint answered {}",
                status
            )));
        }

        let body = response.text().await?;
        match serde_json::from_str::<UpdateCheckResult>(&body) {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!("Could not decode update response: {}", err);
                Ok(UpdateCheckResult::response_error(
                    "could not decode update response",
                ))
            }
        }
    }

    /// Report a stats event such as `checksum_fail` or `revert`.
    /// Failures are logged and swallowed.
    pub async fn send_stats(&self, info: &DeviceInfo, action: &str, version_name: &str) {
        let Some(url) = &self.stats_url else {
            return;
        };

        let mut payload = info.clone();
        payload.action = Some(action.to_string());
        payload.version_name = version_name.to_string();

        match self.http.post(url.clone()).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Reported stats event {} for {}", action, version_name);
            }
            Ok(response) => {
                warn!(
                    "Stats endpoint answered {} for event {}",
                    response.status(),
                    action
                );
            }
            Err(err) => {
                error!("Failed to report stats event {}: {}", action, err);
            }
        }
    }
}
