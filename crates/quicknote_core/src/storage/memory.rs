//! In-process key-value storage with an optional byte quota.
//!
//! Models browser-style local storage: one shared map per origin, a fixed
//! capacity, and writes that fail whole when they would not fit.

use super::{KeyValueStorage, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    write_counts: HashMap<String, usize>,
    quota_bytes: Option<usize>,
}

impl Inner {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

/// Shared in-memory storage handle.
///
/// Clones observe the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStorage {
    /// Unlimited storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys + values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        let storage = Self::new();
        storage.set_quota(Some(quota_bytes));
        storage
    }

    pub fn set_quota(&self, quota_bytes: Option<usize>) {
        self.inner.borrow_mut().quota_bytes = quota_bytes;
    }

    /// Bytes currently held by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.inner.borrow().used_bytes_without("")
    }

    /// Successful writes performed for `key` since creation.
    pub fn write_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .write_counts
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Stores a value without counting it as a write or enforcing the quota.
    pub fn seed(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
    }

    /// Returns the raw stored value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let mut inner = self.inner.borrow_mut();
        if let Some(limit) = inner.quota_bytes {
            let needed = inner.used_bytes_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::CapacityExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        inner.values.insert(key.to_string(), value.to_string());
        *inner.write_counts.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }
}
