//! Persistent key-value storage for user settings
//!
//! Two values survive across sessions: the chosen endpoint URL and the
//! slippage tolerance. Both are stored as strings.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the chosen endpoint URL
pub const ENDPOINT_KEY: &str = "connectionEndpoint";

/// Key holding the slippage tolerance
pub const SLIPPAGE_KEY: &str = "slippage";

/// Slippage used when nothing (or garbage) is persisted
pub const DEFAULT_SLIPPAGE: f64 = 0.25;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Stored value for '{key}' is not valid UTF-8")]
    Encoding { key: String },
}

/// String key-value store backing the persisted settings
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Settings store on top of an embedded sled database
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened settings store");
        Ok(Self { db })
    }

    /// Store that is deleted when dropped
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

impl SettingsStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(raw) => String::from_utf8(raw.to_vec())
                .map(Some)
                .map_err(|_| StorageError::Encoding {
                    key: key.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-process store, nothing is persisted
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the persisted slippage as a number.
///
/// Missing or unparsable values yield [`DEFAULT_SLIPPAGE`].
pub fn load_slippage(store: &dyn SettingsStore) -> Result<f64, StorageError> {
    let Some(raw) = store.get(SLIPPAGE_KEY)? else {
        return Ok(DEFAULT_SLIPPAGE);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => {
            warn!(value = %raw, "Persisted slippage is not a number, using default");
            Ok(DEFAULT_SLIPPAGE)
        }
    }
}

/// Persist slippage as its decimal string
pub fn store_slippage(store: &dyn SettingsStore, slippage: f64) -> Result<(), StorageError> {
    store.set(SLIPPAGE_KEY, &slippage.to_string())
}
