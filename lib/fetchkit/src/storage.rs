//! Token storage.
//!
//! The console keeps the auth token either in persistent storage ("remember
//! me") or in session storage. [`TokenStore`] reads both in that order.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::Result;

/// Storage key the token lives under.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// A string key/value store.
pub trait TokenStorage: Send + Sync {
    /// Value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Process-lifetime storage, the session scope.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Persistent storage backed by a JSON object in a file.
///
/// The file is read once on open and rewritten on every change through a
/// temporary sibling that is renamed into place. A change is only visible to
/// readers once the file write succeeded.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens `path`, starting empty when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => fetchkit_core::from_json(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let bytes = fetchkit_core::to_json(items)?;
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        if let Err(err) = std::fs::write(&temp, &bytes).and_then(|()| std::fs::rename(&temp, &self.path)) {
            let _ = std::fs::remove_file(&temp);
            return Err(err.into());
        }
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }
}

/// Where the bearer token is looked up: persistent storage, then session.
#[derive(Clone)]
pub struct TokenStore {
    persistent: Arc<dyn TokenStorage>,
    session: Arc<dyn TokenStorage>,
    key: String,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TokenStore {
    /// Both scopes backed by the given stores.
    pub fn new(persistent: impl TokenStorage + 'static, session: impl TokenStorage + 'static) -> Self {
        Self {
            persistent: Arc::new(persistent),
            session: Arc::new(session),
            key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }

    /// Both scopes in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), MemoryStorage::new())
    }

    /// Looks the token up under `key` instead of [`DEFAULT_TOKEN_KEY`].
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The current token. Empty values count as absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.persistent
            .get_item(&self.key)
            .filter(|token| !token.is_empty())
            .or_else(|| self.session.get_item(&self.key).filter(|token| !token.is_empty()))
    }

    /// Stores `token` in persistent storage when `persist` is set, in the
    /// session otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen store cannot be written.
    pub fn remember(&self, token: &str, persist: bool) -> Result<()> {
        if persist {
            self.persistent.set_item(&self.key, token)
        } else {
            self.session.set_item(&self.key, token)
        }
    }

    /// Removes the token from both scopes.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub fn clear(&self) -> Result<()> {
        self.persistent.remove_item(&self.key)?;
        self.session.remove_item(&self.key)
    }
}
