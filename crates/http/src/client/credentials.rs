//! Credential persistence boundary
//!
//! The client never assumes a storage technology. It reads and writes the
//! token pair through [`CredentialStore`], keyed by opaque strings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Access token key
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Refresh token key
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Serialized user profile key
pub const USER_KEY: &str = "user";

/// Key/value storage for the session credentials.
///
/// Implementations must be `Send + Sync`; the client is shared between
/// tasks.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);

    /// Replace both tokens. Stores that can write several keys at once
    /// should override this so a reader never sees a mixed pair.
    fn set_pair(&self, access_token: &str, refresh_token: &str) {
        self.set(AUTH_TOKEN_KEY, access_token);
        self.set(REFRESH_TOKEN_KEY, refresh_token);
    }

    /// Drop every session key
    fn clear(&self) {
        for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            self.remove(key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token pair
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        store.set_pair(access_token, refresh_token);
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }

    fn set_pair(&self, access_token: &str, refresh_token: &str) {
        let mut entries = lock(&self.entries);
        entries.insert(AUTH_TOKEN_KEY.to_string(), access_token.to_string());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh_token.to_string());
    }

    fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// JSON file backed store, so a session survives between CLI runs.
///
/// Every mutation rewrites the whole file. Write failures are logged and
/// the in-memory copy stays authoritative for the rest of the process.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`; a missing file is an empty store
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_vec_pretty(entries)?;
            std::fs::write(&self.path, content)
        })();

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to persist credentials");
        }
    }

    fn update<F: FnOnce(&mut BTreeMap<String, String>)>(&self, f: F) {
        let mut entries = lock(&self.entries);
        f(&mut entries);
        self.persist(&entries);
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        self.update(|entries| {
            entries.remove(key);
        });
    }

    fn set_pair(&self, access_token: &str, refresh_token: &str) {
        self.update(|entries| {
            entries.insert(AUTH_TOKEN_KEY.to_string(), access_token.to_string());
            entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh_token.to_string());
        });
    }

    fn clear(&self) {
        self.update(BTreeMap::clear);
    }
}
