//! Bearer token storage.
//!
//! Primitives report storage failures; callers decide how to degrade.
//! [`token_or_empty`] is the degrade-to-logged-out policy the API client uses.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use portal_logging::{portal_debug, portal_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::AtomicFileWriter;

/// File holding the persisted session, relative to the data directory.
pub const SESSION_FILENAME: &str = ".portal_session.ron";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token storage unavailable: {reason}")]
pub struct StorageUnavailable {
    pub reason: String,
}

impl StorageUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageUnavailable>;
    fn store(&self, token: &str) -> Result<(), StorageUnavailable>;
    fn clear(&self) -> Result<(), StorageUnavailable>;
}

/// The stored token, or an empty string when absent or unreadable.
pub fn token_or_empty(store: &dyn TokenStore) -> String {
    match store.load() {
        Ok(token) => token.unwrap_or_default(),
        Err(err) => {
            portal_warn!("Treating session as logged out: {err}");
            String::new()
        }
    }
}

pub fn is_logged_in(store: &dyn TokenStore) -> bool {
    !token_or_empty(store).is_empty()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    access_token: Option<String>,
}

/// Token persisted as a small RON file in the data directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILENAME)
    }

    fn write(&self, session: &PersistedSession) -> Result<(), StorageUnavailable> {
        let content = ron::ser::to_string_pretty(session, ron::ser::PrettyConfig::new())
            .map_err(|err| StorageUnavailable::new(err.to_string()))?;
        AtomicFileWriter::new(self.dir.clone())
            .write(SESSION_FILENAME, content.as_bytes())
            .map_err(|err| StorageUnavailable::new(err.to_string()))?;
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<PersistedSession, StorageUnavailable> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PersistedSession::default());
        }
        Err(err) => return Err(StorageUnavailable::new(err.to_string())),
    };
    ron::from_str(&content).map_err(|err| StorageUnavailable::new(err.to_string()))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageUnavailable> {
        let session = read_session(&self.path())?;
        Ok(session.access_token.filter(|token| !token.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), StorageUnavailable> {
        portal_debug!("Storing session token in {:?}", self.path());
        self.write(&PersistedSession {
            access_token: Some(token.to_string()),
        })
    }

    fn clear(&self) -> Result<(), StorageUnavailable> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageUnavailable::new(err.to_string())),
        }
    }
}

/// In-process store. `failing()` behaves like disabled storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
            unavailable: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            token: Mutex::new(None),
            unavailable: true,
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StorageUnavailable> {
        if self.unavailable {
            return Err(StorageUnavailable::new("storage disabled"));
        }
        self.token
            .lock()
            .map_err(|_| StorageUnavailable::new("token lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageUnavailable> {
        Ok(self.slot()?.clone().filter(|token| !token.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), StorageUnavailable> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageUnavailable> {
        *self.slot()? = None;
        Ok(())
    }
}
