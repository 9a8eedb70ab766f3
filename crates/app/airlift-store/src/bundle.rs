//! Bundle identity and lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id of the payload shipped inside the application package.
pub const BUILTIN_ID: &str = "builtin";

/// Lifecycle state of a bundle in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleStatus {
    Pending,
    Downloading,
    Success,
    Error,
    Deleted,
}

impl BundleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleStatus::Pending => "pending",
            BundleStatus::Downloading => "downloading",
            BundleStatus::Success => "success",
            BundleStatus::Error => "error",
            BundleStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One catalog entry: a versioned payload the host can load content from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleInfo {
    /// Opaque, stable id. Never reused after deletion.
    pub id: String,
    /// Human version string. Not assumed to be orderable.
    pub version_name: String,
    /// Hex sha256 of the verified archive; empty until verification.
    #[serde(default)]
    pub checksum: String,
    pub status: BundleStatus,
    #[serde(default)]
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl BundleInfo {
    pub(crate) fn new(id: String, version_name: String) -> Self {
        Self {
            id,
            version_name,
            checksum: String::new(),
            status: BundleStatus::Pending,
            downloaded_at: None,
        }
    }

    /// The sentinel entry for the store-shipped payload. Always valid,
    /// never deleted, never overwritten.
    pub fn builtin() -> Self {
        Self {
            id: BUILTIN_ID.to_string(),
            version_name: BUILTIN_ID.to_string(),
            checksum: String::new(),
            status: BundleStatus::Success,
            downloaded_at: None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.id == BUILTIN_ID
    }

    pub fn is_downloaded(&self) -> bool {
        self.status == BundleStatus::Success
    }

    pub fn is_error_status(&self) -> bool {
        self.status == BundleStatus::Error
    }

    pub fn is_deleted(&self) -> bool {
        self.status == BundleStatus::Deleted
    }
}

impl std::fmt::Display for BundleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.version_name, self.id, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_always_a_valid_target() {
        let builtin = BundleInfo::builtin();
        assert!(builtin.is_builtin());
        assert!(builtin.is_downloaded());
        assert!(!builtin.is_error_status());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BundleStatus::Downloading).unwrap();
        assert_eq!(json, "\"downloading\"");
        let back: BundleStatus = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(back, BundleStatus::Success);
    }

    #[test]
    fn test_display_mentions_version_and_state() {
        let mut info = BundleInfo::new("abc".into(), "1.2.3".into());
        info.status = BundleStatus::Error;
        assert_eq!(info.to_string(), "1.2.3 (abc, error)");
    }
}
