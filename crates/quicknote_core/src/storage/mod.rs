//! Key-value persistence backends for store snapshots.
//!
//! # Responsibility
//! - Define the synchronous get/set contract the note store persists through.
//! - Provide in-memory, file and SQLite implementations of that contract.
//!
//! # Invariants
//! - Backends have no transactions beyond a single-key write.
//! - A failed write leaves the previous value readable.
//! - Reading a key that was never written is `Ok(None)`, not an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend failure.
#[derive(Debug)]
pub enum StorageError {
    /// The write would exceed the backend's capacity.
    CapacityExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
    /// The value could not be encoded for storage.
    Serialization(String),
    /// Key is empty or contains characters the backend cannot address.
    InvalidKey(String),
    Io(std::io::Error),
    Db(DbError),
}

impl StorageError {
    /// Stable machine-readable code for logs and status reporting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Serialization(_) => "serialization_error",
            Self::InvalidKey(_) => "invalid_key",
            Self::Io(_) => "io_error",
            Self::Db(_) => "db_error",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded { key, needed, limit } => write!(
                f,
                "storage capacity exceeded for `{key}`: needs {needed} bytes, limit {limit}"
            ),
            Self::Serialization(message) => write!(f, "failed to serialize value: {message}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value store.
pub trait KeyValueStorage {
    /// Returns the value stored under `key`, or `None` if never written.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}
