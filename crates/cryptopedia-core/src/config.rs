//! Application configuration management.
//!
//! Configuration is stored at `~/.config/cryptopedia/config.json` and holds
//! the API endpoint, the token storage backend and the last login email.
//! `CRYPTOPEDIA_API_URL` in the environment overrides the endpoint.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::DEFAULT_BASE_URL;
use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, Storage, TokenStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "cryptopedia";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file name for the file storage backend
const STORAGE_FILE: &str = "storage.json";

/// Environment variable overriding the API endpoint
pub const API_URL_ENV: &str = "CRYPTOPEDIA_API_URL";

/// Where tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {:?}", path))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Endpoint from the environment, then the file, then the default.
    pub fn api_url(&self) -> String {
        self.api_url_with(std::env::var(API_URL_ENV).ok())
    }

    fn api_url_with(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Token store for the configured backend.
    pub fn token_store(&self) -> Result<TokenStore> {
        let storage: Arc<dyn Storage> = match self.storage {
            StorageBackend::File => {
                let path = self.data_dir()?.join(STORAGE_FILE);
                debug!(path = ?path, "Using file token storage");
                Arc::new(FileStorage::new(path))
            }
            StorageBackend::Keyring => Arc::new(KeyringStorage),
            StorageBackend::Memory => Arc::new(MemoryStorage::default()),
        };
        Ok(TokenStore::new(storage))
    }
}
