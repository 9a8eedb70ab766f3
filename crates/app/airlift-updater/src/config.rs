use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{UpdaterError, UpdaterResult};

/// Runtime configuration of the update orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// How long a freshly activated bundle has to confirm readiness before
    /// it is rolled back.
    #[serde(with = "humantime_serde")]
    pub app_ready_timeout: Duration,
    /// Delete a bundle that failed the readiness check after rolling back.
    pub auto_delete_failed: bool,
    /// Delete the previous fallback once a newer bundle passes readiness.
    pub auto_delete_previous: bool,
    /// Poll the update endpoint automatically.
    pub auto_update: bool,
    /// Latest-version endpoint. Auto update stays off while this is empty.
    pub auto_update_url: String,
    /// Hard-reset to builtin and wipe the catalog when the native
    /// application version changes between launches.
    pub reset_when_update: bool,
    /// Stats endpoint; empty disables reporting.
    pub stats_url: String,
    /// Activate a downloaded update immediately instead of arming it for
    /// the next restart.
    pub direct_update: bool,
    /// Interval of the periodic update check. Zero disables the timer.
    #[serde(with = "humantime_serde")]
    pub period_check_delay: Duration,
    /// HTTP timeout for metadata requests.
    #[serde(with = "humantime_serde")]
    pub response_timeout: Duration,
    pub app_id: String,
    /// Native application version, compared across launches.
    pub version_build: String,
    pub version_code: String,
    pub version_os: String,
    pub custom_id: String,
    pub channel: Option<String>,
    pub default_channel: Option<String>,
    pub platform: String,
    pub is_emulator: bool,
    pub is_prod: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            app_ready_timeout: Duration::from_secs(10),
            auto_delete_failed: true,
            auto_delete_previous: true,
            auto_update: false,
            auto_update_url: String::new(),
            reset_when_update: true,
            stats_url: String::new(),
            direct_update: false,
            period_check_delay: Duration::from_secs(600),
            response_timeout: Duration::from_secs(20),
            app_id: String::new(),
            version_build: "0.0.0".to_string(),
            version_code: String::new(),
            version_os: String::new(),
            custom_id: String::new(),
            channel: None,
            default_channel: None,
            platform: std::env::consts::OS.to_string(),
            is_emulator: false,
            is_prod: false,
        }
    }
}

impl UpdaterConfig {
    pub fn validate(&self) -> UpdaterResult<()> {
        if self.app_ready_timeout.is_zero() {
            return Err(UpdaterError::InvalidConfig(
                "app_ready_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Auto update requires both the flag and a configured endpoint.
    pub fn is_auto_update_enabled(&self) -> bool {
        self.auto_update && !self.auto_update_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpdaterConfig::default();
        assert_eq!(config.app_ready_timeout, Duration::from_secs(10));
        assert!(config.auto_delete_failed);
        assert!(config.auto_delete_previous);
        assert!(!config.auto_update);
        assert!(config.reset_when_update);
        assert!(!config.direct_update);
        assert_eq!(config.period_check_delay, Duration::from_secs(600));
        config.validate().unwrap();
    }

    #[test]
    fn test_auto_update_needs_a_url() {
        let mut config = UpdaterConfig {
            auto_update: true,
            ..Default::default()
        };
        assert!(!config.is_auto_update_enabled());

        config.auto_update_url = "https://updates.example.com/latest".to_string();
        assert!(config.is_auto_update_enabled());
    }

    #[test]
    fn test_zero_ready_timeout_is_rejected() {
        let config = UpdaterConfig {
            app_ready_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(UpdaterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_durations_round_trip_as_humantime() {
        let config = UpdaterConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["app_ready_timeout"], "10s");
        assert_eq!(json["period_check_delay"], "10m");

        let back: UpdaterConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.period_check_delay, Duration::from_secs(600));
    }
}
