//! Wire types exchanged with the update and stats endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Device/application identity sent with every metadata and stats request.
/// The server uses it for targeting (channels, staged rollouts).
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub platform: String,
    pub device_id: String,
    pub app_id: String,
    pub custom_id: String,
    pub version_build: String,
    pub version_code: String,
    pub version_os: String,
    /// Version name of the currently active bundle.
    pub version_name: String,
    pub plugin_version: String,
    pub is_emulator: bool,
    pub is_prod: bool,
    /// Stats event name; only present on stats requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(rename = "defaultChannel", skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,
}

/// Decoded response of a latest-version query.
///
/// An `error` or `message` short-circuits the update cycle without being a
/// fault; a missing `url` means "no update available".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCheckResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub major: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "session_key")]
    pub session_key: Option<String>,
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

impl UpdateCheckResult {
    /// Build the result used when the endpoint misbehaves (non-2xx status,
    /// undecodable body). Treated as "no update", never as a fault.
    pub fn response_error(message: impl Into<String>) -> Self {
        Self {
            error: Some("response_error".to_string()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Whether the response names a concrete downloadable version.
    pub fn has_update_candidate(&self) -> bool {
        !self.url.is_empty() && !self.version.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_partial_responses() {
        let res: UpdateCheckResult = serde_json::from_str(r#"{"message":"up to date"}"#).unwrap();
        assert_eq!(res.message.as_deref(), Some("up to date"));
        assert!(!res.has_update_candidate());

        let res: UpdateCheckResult = serde_json::from_str(
            r#"{"url":"https://x/1.zip","version":"1.1.0","checksum":"abc","major":true,
                "session_key":"k","data":{"k":"v"}}"#,
        )
        .unwrap();
        assert!(res.has_update_candidate());
        assert!(res.major);
        assert_eq!(res.session_key.as_deref(), Some("k"));
        assert_eq!(res.data.unwrap().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_response_error_is_not_an_update() {
        let res = UpdateCheckResult::response_error("boom");
        assert_eq!(res.error.as_deref(), Some("response_error"));
        assert!(!res.has_update_candidate());
    }

    #[test]
    fn test_device_info_wire_shape() {
        let info = DeviceInfo {
            platform: "linux".into(),
            device_id: "dev-1".into(),
            app_id: "app.example".into(),
            custom_id: String::new(),
            version_build: "2.0.0".into(),
            version_code: "200".into(),
            version_os: "6.1".into(),
            version_name: "1.0.0".into(),
            plugin_version: "0.0.0".into(),
            is_emulator: false,
            is_prod: true,
            action: None,
            channel: None,
            default_channel: Some("production".into()),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["device_id"], "dev-1");
        assert_eq!(value["defaultChannel"], "production");
        // Optional fields stay off the wire entirely.
        assert!(value.get("action").is_none());
        assert!(value.get("channel").is_none());
    }
}
