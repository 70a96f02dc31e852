//! Key/value persistence boundary for client state.
//!
//! # Responsibility
//! - Define the backend contract shared by session-scoped and long-lived stores.
//! - Own every storage-specific failure path so stores never inspect them.
//!
//! # Invariants
//! - `StorageAdapter::load`, `save` and `remove` are total: they never return
//!   an error and never panic.
//! - `try_*` variants expose the same paths as `StorageResult` for callers and
//!   tests that need to inspect the failure.
//! - Values are stored in their JSON-serialized form.

use crate::db::DbError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::{MemoryStorage, DEFAULT_SESSION_QUOTA_BYTES};
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure taxonomy for storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage capability is absent (disabled, private mode, no backend).
    Unavailable,
    /// Write rejected because the backend is full.
    QuotaExceeded { key: String, limit_bytes: usize },
    /// Stored text exists but does not parse as the requested type.
    Malformed { key: String, message: String },
    /// Value could not be serialized before writing.
    Serialization(String),
    /// Backend transport error (SQLite, lock state).
    Backend(String),
}

impl StorageError {
    /// Stable error code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "storage_unavailable",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Malformed { .. } => "malformed_value",
            Self::Serialization(_) => "serialization_failed",
            Self::Backend(_) => "backend_error",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage is unavailable"),
            Self::QuotaExceeded { key, limit_bytes } => {
                write!(f, "storage quota of {limit_bytes} bytes exceeded writing `{key}`")
            }
            Self::Malformed { key, message } => {
                write!(f, "stored value for `{key}` is malformed: {message}")
            }
            Self::Serialization(message) => write!(f, "failed to serialize value: {message}"),
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
        }
    }
}

impl Error for StorageError {}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// Raw string key/value backend.
///
/// Implementations are shared between every store that writes to the same
/// key space, so they must be `Send + Sync`.
pub trait StorageBackend: Send + Sync {
    /// Short scope label used in log events (`session`, `persistent`, ...).
    fn scope(&self) -> &'static str;
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// Backend standing in for a missing storage capability.
///
/// Every call fails with `StorageError::Unavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn scope(&self) -> &'static str {
        "unavailable"
    }

    fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }

    fn remove_item(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }
}

/// JSON-typed access to one storage backend.
#[derive(Clone)]
pub struct StorageAdapter {
    backend: Arc<dyn StorageBackend>,
}

impl StorageAdapter {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Adapter over a fresh session-scoped memory backend.
    pub fn session() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Adapter whose backend is always unavailable.
    pub fn unavailable() -> Self {
        Self::new(Arc::new(UnavailableStorage))
    }

    pub fn scope(&self) -> &'static str {
        self.backend.scope()
    }

    /// Reads and parses `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(raw) = self.backend.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Malformed {
                key: key.to_string(),
                message: err.to_string(),
            })
    }

    /// Serializes `value` and writes it under `key`.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.backend.set_item(key, &raw)
    }

    pub fn try_remove(&self, key: &str) -> StorageResult<()> {
        self.backend.remove_item(key)
    }

    /// Reads `key`, substituting `default` on absence or any failure.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(
                    "event=storage_load module=storage status=miss scope={} key={key}",
                    self.scope()
                );
                default
            }
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=absorbed scope={} key={key} error_code={}",
                    self.scope(),
                    err.code()
                );
                default
            }
        }
    }

    /// Writes `value` under `key`; failures are logged and dropped.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_save(key, value) {
            warn!(
                "event=storage_save module=storage status=absorbed scope={} key={key} error_code={}",
                self.scope(),
                err.code()
            );
        }
    }

    /// Deletes `key`; failures are logged and dropped.
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.try_remove(key) {
            warn!(
                "event=storage_remove module=storage status=absorbed scope={} key={key} error_code={}",
                self.scope(),
                err.code()
            );
        }
    }
}

impl std::fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("scope", &self.scope())
            .finish()
    }
}
