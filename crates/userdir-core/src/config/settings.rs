//! Local client settings.
//!
//! Settings are stored at `~/.config/userdir/settings.json` and select the
//! API root, the session storage backend and the request timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::{FileStore, KeychainStore, MemoryStore, SessionStore};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "userdir";

/// Settings file name
const SETTINGS_FILE: &str = "settings.json";

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Environment variable overriding the API root
pub const API_ROOT_ENV: &str = "USERDIR_API_ROOT";

const DEFAULT_API_ROOT: &str = "https://localhost/api/";

/// Where the session credential is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[default]
    File,
    Keychain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_root_url: String,
    pub storage: StorageKind,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_root_url: DEFAULT_API_ROOT.to_string(),
            storage: StorageKind::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientSettings {
    /// Load settings from the user's config directory, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::settings_path()?)?;
        if let Ok(root) = std::env::var(API_ROOT_ENV) {
            if !root.trim().is_empty() {
                settings.api_root_url = root;
            }
        }
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(SETTINGS_FILE))
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(SESSION_FILE))
    }

    /// Open the session store selected by `storage`.
    pub fn open_store(&self) -> Result<SessionStore> {
        Ok(match self.storage {
            StorageKind::Memory => SessionStore::new(MemoryStore::new()),
            StorageKind::File => SessionStore::new(FileStore::new(self.session_path()?)),
            StorageKind::Keychain => SessionStore::new(KeychainStore::new(APP_NAME)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ClientSettings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.storage, StorageKind::File);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = ClientSettings {
            api_root_url: "https://users.example.com/api/".to_string(),
            storage: StorageKind::Keychain,
            request_timeout_secs: 5,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(ClientSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"storage": "memory"}"#).unwrap();

        let settings = ClientSettings::load_from(&path).unwrap();
        assert_eq!(settings.storage, StorageKind::Memory);
        assert_eq!(settings.api_root_url, DEFAULT_API_ROOT);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{").unwrap();
        assert!(ClientSettings::load_from(&path).is_err());
    }
}
