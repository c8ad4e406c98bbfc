//! CLI configuration.
//!
//! Stored as JSON at `~/.config/ledgerdrive/config.json` unless `--config`
//! points elsewhere. A missing file means defaults; a malformed one is
//! reported and ignored.

use std::path::{Path, PathBuf};

use ledgerdrive_file_manager::UploadLimits;
use ledgerdrive_protocol::constants::ANONYMOUS_PRINCIPAL;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Base URL of the backend; requests go to `{backend_url}/rpc`.
    pub backend_url: String,

    /// Principal requests are made as.
    pub principal: String,

    pub request_timeout_secs: u64,

    pub limits: UploadLimits,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:4943".into(),
            principal: ANONYMOUS_PRINCIPAL.into(),
            request_timeout_secs: 30,
            limits: UploadLimits::default(),
        }
    }
}

impl CliConfig {
    /// Loads the config from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<CliConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("ledgerdrive").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home).join(".config"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.principal, "2vxsx-fae");
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(CliConfig::load(Some(&path)).unwrap(), CliConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"backend_url": "https://drive.example", "limits": {"max_bytes": 5}}"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend_url, "https://drive.example");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.limits.max_bytes, 5);
        assert_eq!(config.limits.anonymous_max_bytes, 1_000_000);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = CliConfig {
            principal: "aaaaa-aa".into(),
            ..CliConfig::default()
        };

        config.save(&path).unwrap();

        assert_eq!(CliConfig::load(Some(&path)).unwrap(), config);
    }
}
