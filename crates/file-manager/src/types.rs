//! Data types for the upload flow and asset views.

use ledgerdrive_protocol::AssetTreeNode;
use ledgerdrive_protocol::constants::ANONYMOUS_PRINCIPAL;
use serde::{Deserialize, Serialize};

use crate::error::FileManagerError;
use crate::selected::SelectedFile;

/// Selected files converted into the backend's nested asset schema.
#[derive(Debug, Clone)]
pub struct MappedSelection {
    /// Top-level asset nodes.
    pub assets: Vec<AssetTreeNode>,
    /// Selected files, in the order their leaves were attached to `assets`.
    pub files: Vec<SelectedFile>,
    /// Sum of all selected file sizes.
    pub total_bytes: u64,
}

/// Client-side caps on the size of a single upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Cap for the anonymous principal.
    pub anonymous_max_bytes: u64,
    /// Cap for everyone not listed in `unlimited_principals`.
    pub max_bytes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlimited_principals: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            anonymous_max_bytes: 1_000_000,
            max_bytes: 10_000_000,
            unlimited_principals: Vec::new(),
        }
    }
}

impl UploadLimits {
    /// Fails if `principal` may not upload `total_bytes` at once.
    pub fn check(&self, principal: &str, total_bytes: u64) -> Result<(), FileManagerError> {
        if principal == ANONYMOUS_PRINCIPAL && total_bytes > self.anonymous_max_bytes {
            return Err(FileManagerError::UploadLimit {
                total_bytes,
                limit: self.anonymous_max_bytes,
            });
        }
        let unlimited = self.unlimited_principals.iter().any(|p| p == principal);
        if !unlimited && total_bytes > self.max_bytes {
            return Err(FileManagerError::UploadLimit {
                total_bytes,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// What a settled upload went through.
///
/// Informational only: batch failures are not retried, so the backend
/// has to be re-queried to know which files are complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub files_created: usize,
    pub files_bound: usize,
    pub chunks: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Recursive size and file count of a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryTotals {
    pub total_bytes: u64,
    pub total_files: u64,
    /// Directories directly inside this one.
    pub subdirectories: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_cap_applies_to_anonymous_only() {
        let limits = UploadLimits::default();
        assert!(limits.check(ANONYMOUS_PRINCIPAL, 1_000_000).is_ok());
        assert!(matches!(
            limits.check(ANONYMOUS_PRINCIPAL, 1_000_001),
            Err(FileManagerError::UploadLimit {
                limit: 1_000_000,
                ..
            })
        ));
        assert!(limits.check("someone", 5_000_000).is_ok());
    }

    #[test]
    fn global_cap_skips_unlimited_principals() {
        let limits = UploadLimits {
            unlimited_principals: vec!["admin".into()],
            ..UploadLimits::default()
        };
        assert!(matches!(
            limits.check("someone", 10_000_001),
            Err(FileManagerError::UploadLimit {
                limit: 10_000_000,
                ..
            })
        ));
        assert!(limits.check("admin", 50_000_000).is_ok());
    }

    #[test]
    fn limits_from_partial_json() {
        let limits: UploadLimits = serde_json::from_str(r#"{"max_bytes": 42}"#).unwrap();
        assert_eq!(limits.max_bytes, 42);
        assert_eq!(limits.anonymous_max_bytes, 1_000_000);
    }
}
