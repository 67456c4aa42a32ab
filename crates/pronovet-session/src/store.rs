//! Durable client-side session storage.
//!
//! The session is a handful of strings under fixed keys: the access
//! token, the refresh token, the username, and a "keep me logged in"
//! flag. Everything that reads or writes them goes through the
//! [`SessionStore`] trait, so the authenticated client never knows
//! whether it is talking to a file, a keychain, or a test double.
//!
//! # Concurrency note
//!
//! Each method is atomic on its own. Sequences of calls (read the refresh
//! token, then write the access token) are NOT atomic; the session layer
//! serializes those itself where it matters.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionKey
// ---------------------------------------------------------------------------

/// The fixed keys a session is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    Username,
    KeepLoggedIn,
}

impl SessionKey {
    /// Every key, in storage order. `clear()` must remove all of these.
    pub const ALL: [SessionKey; 4] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::Username,
        Self::KeepLoggedIn,
    ];

    /// The storage key string. These match what browser builds of the
    /// admin UI keep in local storage, so a session file is readable by
    /// either.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::Username => "username",
            Self::KeepLoggedIn => "keepLoggedIn",
        }
    }

    /// Looks a key up by its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Key/value storage for the session.
///
/// `Send + Sync` because one store is shared (behind an `Arc`) by every
/// request a client makes, from any Tokio task.
pub trait SessionStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent.
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: SessionKey) -> Result<(), SessionError>;

    /// Removes every session key.
    fn clear(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// A process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileSessionStore
// ---------------------------------------------------------------------------

/// A store backed by a JSON object in a file, e.g.
/// `{"accessToken": "...", "refreshToken": "...", "username": "jdoe"}`.
///
/// Every call re-reads the file, so two processes sharing one file see
/// each other's logins and logouts. Writes go to a sibling temp file
/// that is then renamed over the original.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Creates a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            SessionError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    fn write_all(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under the in-process lock.
    fn update(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), SessionError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut values = self.read_all()?;
        f(&mut values);
        self.write_all(&values)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        Ok(self.read_all()?.remove(key.as_str()))
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        self.update(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        self.update(|values| {
            values.remove(key.as_str());
        })
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
