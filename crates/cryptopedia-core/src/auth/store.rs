//! Persistent token storage.
//!
//! `TokenStore` is a best-effort facade: it never fails. Backend errors are
//! logged and degrade to "no token".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Keychain service name
const SERVICE_NAME: &str = "cryptopedia";

/// String key/value storage.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Read several entries, one result per key in order. Backends that can
    /// take a single snapshot do so, so the values belong to one write.
    fn get_many(&self, keys: &[&str]) -> Vec<Result<Option<String>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Write several entries. Backends commit them together when they can.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// Token pair as persisted. Either side may be missing after a bad load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Tokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access_token: Some(access.into()),
            refresh_token: Some(refresh.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    /// One token present without the other.
    pub fn is_partial(&self) -> bool {
        self.access_token.is_some() != self.refresh_token.is_some()
    }
}

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    fn accept(key: &str, result: Option<Result<Option<String>>>) -> Option<String> {
        match result {
            Some(Ok(value)) => value.filter(|v| !v.is_empty()),
            Some(Err(e)) => {
                warn!(key, error = %e, "Failed to read token, treating as absent");
                None
            }
            None => None,
        }
    }

    /// Read both tokens from one storage snapshot. Never fails.
    pub fn load(&self) -> Tokens {
        let keys = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY];
        let mut values = self.storage.get_many(&keys).into_iter();
        Tokens {
            access_token: Self::accept(ACCESS_TOKEN_KEY, values.next()),
            refresh_token: Self::accept(REFRESH_TOKEN_KEY, values.next()),
        }
    }

    /// Write both tokens.
    pub fn save(&self, access: &str, refresh: &str) {
        let entries = [(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)];
        if let Err(e) = self.storage.set_many(&entries) {
            warn!(error = %e, "Failed to persist tokens");
        } else {
            debug!("Tokens persisted");
        }
    }

    /// Remove both tokens.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY]) {
            warn!(error = %e, "Failed to clear tokens");
        } else {
            debug!("Tokens cleared");
        }
    }
}

// ============================================================================
// Backends
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.entries();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON object on disk, one string entry per key.
///
/// Writes go to a sibling temp file that is renamed into place, so a
/// multi-key write lands all at once.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole map. A missing or corrupt file reads as empty.
    fn read_map(&self) -> Map<String, Value> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read storage file");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = ?self.path, "Storage file is corrupt, ignoring contents");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory {:?}", parent))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&tmp, contents).context("Failed to write storage file")?;
        std::fs::rename(&tmp, &self.path).context("Failed to commit storage file")?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        Ok(self
            .read_map()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn get_many(&self, keys: &[&str]) -> Vec<Result<Option<String>>> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let map = self.read_map();
        keys.iter()
            .map(|key| Ok(map.get(*key).and_then(Value::as_str).map(str::to_string)))
            .collect()
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut map = self.read_map();
        for (key, value) in entries {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut map = self.read_map();
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before && !self.path.exists() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

/// OS keychain, one credential per key.
///
/// The keychain has no multi-entry transaction: a crash between the two
/// writes of `set_many` can leave one token stale.
#[derive(Debug, Default)]
pub struct KeyringStorage;

impl KeyringStorage {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl Storage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            Self::entry(key)?
                .set_password(value)
                .context("Failed to store token in keychain")?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            match Self::entry(key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(e).context("Failed to delete token from keychain"),
            }
        }
        Ok(())
    }
}
