//! Client-side key-value storage for session credentials
//!
//! The backend hands out an access/refresh token pair on login and on every
//! refresh. They are kept in a small string key-value store, together with
//! a JSON blob describing the logged-in user. [`Session`] is the typed view
//! over that store that the HTTP client holds.

use crate::config::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Process-wide string key-value storage
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Volatile store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CoreError::storage_error("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .map_err(|_| CoreError::storage_error("memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries
            .write()
            .map_err(|_| CoreError::storage_error("memory store lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object on disk.
///
/// Every write rewrites the whole file; the map is tiny.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file is missing
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened credential store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content).inspect_err(|e| {
            tracing::warn!(path = %self.path.display(), "Failed to persist credentials: {e}");
        })?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_error("file store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_error("file store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_error("file store lock poisoned"))?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Typed session state over a [`CredentialStore`]
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Session backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Current access token, if one is stored and non-empty
    pub fn access_token(&self) -> CoreResult<Option<String>> {
        Ok(self
            .store
            .get(ACCESS_TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    /// Current refresh token, if one is stored and non-empty
    pub fn refresh_token(&self) -> CoreResult<Option<String>> {
        Ok(self
            .store
            .get(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    /// Overwrite both stored tokens
    pub fn store_tokens(&self, tokens: &TokenPair) -> CoreResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)
    }

    /// Deserialize the stored user-info blob
    pub fn user_info<T: for<'de> Deserialize<'de>>(&self) -> CoreResult<Option<T>> {
        match self.store.get(USER_INFO_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn store_user_info<T: Serialize>(&self, info: &T) -> CoreResult<()> {
        let raw = serde_json::to_string(info)?;
        self.store.set(USER_INFO_KEY, &raw)
    }

    /// Forget tokens and user info
    pub fn clear(&self) -> CoreResult<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_INFO_KEY)
    }

    pub fn is_logged_in(&self) -> CoreResult<bool> {
        Ok(self.access_token()?.is_some())
    }
}
