//! SQLite-backed key-value storage.
//!
//! Values live in the single `kv` table created by the `db` migrations.

use super::{KeyValueStorage, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key-value storage on top of a migrated SQLite connection.
pub struct SqliteStorage {
    conn: Connection,
    max_value_bytes: Option<usize>,
}

impl SqliteStorage {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already went through `db` bootstrap.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            max_value_bytes: None,
        }
    }

    /// Rejects writes whose value exceeds `max_value_bytes`.
    pub fn with_value_limit(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = Some(max_value_bytes);
        self
    }

    /// Lists stored keys in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key ASC;")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}

impl KeyValueStorage for SqliteStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if let Some(limit) = self.max_value_bytes {
            if value.len() > limit {
                return Err(StorageError::CapacityExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    limit,
                });
            }
        }

        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStorage;
    use crate::storage::{KeyValueStorage, StorageError};

    #[test]
    fn upsert_replaces_previous_value() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.read("k").unwrap(), None);

        storage.write("k", "one").unwrap();
        storage.write("k", "two").unwrap();
        storage.write("other", "x").unwrap();

        assert_eq!(storage.read("k").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.keys().unwrap(), vec!["k", "other"]);
    }

    #[test]
    fn value_limit_maps_to_capacity_error() {
        let mut storage = SqliteStorage::open_in_memory()
            .unwrap()
            .with_value_limit(3);
        let err = storage.write("k", "four").unwrap_err();
        assert!(matches!(err, StorageError::CapacityExceeded { limit: 3, .. }));
        assert_eq!(storage.read("k").unwrap(), None);
    }
}
