//! Process-wide session cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::value::{CacheValue, SessionRecord};

/// Key/value store backing interview sessions.
///
/// Every operation runs under one mutex covering the whole map, so
/// concurrent calls are serialized process-wide and each call is atomic.
/// The lock is never held across an `.await`. If throughput ever matters
/// more than simplicity, this can be sharded per key without changing the
/// public API.
///
/// Entries never expire. [`SessionCache::delete`] and
/// [`SessionCache::clear_all`] are the only ways to evict.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    inner: Arc<Mutex<HashMap<String, CacheValue>>>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value at `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<CacheValue>) {
        let key = key.into();
        let value = value.into();
        let kind = value.kind();
        let mut map = self.inner.lock();
        let replaced = map.insert(key.clone(), value).is_some();
        debug!(key = %key, kind, replaced, "Value stored in cache");
    }

    /// Get a copy of the value at `key`.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        trace!(key = %key, "Reading from cache");
        self.inner.lock().get(key).cloned()
    }

    /// Get the value at `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: CacheValue) -> CacheValue {
        self.get(key).unwrap_or(default)
    }

    /// Get the record at `key`, if `key` holds one.
    pub fn get_record(&self, key: &str) -> Option<SessionRecord> {
        self.inner.lock().get(key).and_then(|v| v.as_record().cloned())
    }

    /// Get a copy of the list at `key`, if `key` holds one.
    pub fn get_list(&self, key: &str) -> Option<Vec<Value>> {
        self.inner.lock().get(key).and_then(|v| v.as_list().map(<[Value]>::to_vec))
    }

    /// Check whether `key` currently maps to a value.
    pub fn has(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Remove the value at `key`. Absent keys are a no-op.
    pub fn delete(&self, key: &str) -> Option<CacheValue> {
        let removed = self.inner.lock().remove(key);
        if removed.is_some() {
            debug!(key = %key, "Key cleared from cache");
        }
        removed
    }

    /// Remove every entry.
    pub fn clear_all(&self) {
        let mut map = self.inner.lock();
        let count = map.len();
        map.clear();
        debug!(count, "All keys cleared from cache");
    }

    /// Check whether `key` holds a [`SessionRecord`].
    pub fn has_record(&self, key: &str) -> bool {
        matches!(self.inner.lock().get(key), Some(CacheValue::Record(_)))
    }

    /// Append `value` to the list at `key`, creating the list if absent.
    ///
    /// Returns the list length after the append. Fails with
    /// [`Error::NotAList`] when `key` holds something other than a list;
    /// the existing value is left as it was.
    pub fn append_to_list(&self, key: &str, value: impl Into<Value>) -> Result<usize> {
        let mut map = self.inner.lock();
        push_to_list(&mut map, key, value.into())
    }

    /// Append to the list at `key` only while `owner` holds a record.
    ///
    /// The check and the append happen under one lock, so a list is never
    /// created for an owner that was deleted concurrently. Fails with
    /// [`Error::NotFound`] naming `owner` when the record is gone.
    pub fn append_to_list_for(
        &self,
        owner: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<usize> {
        let mut map = self.inner.lock();
        if !matches!(map.get(owner), Some(CacheValue::Record(_))) {
            debug!(owner = %owner, key = %key, "Refusing to append for missing record");
            return Err(Error::NotFound(owner.to_string()));
        }
        push_to_list(&mut map, key, value.into())
    }

    /// Remove the first element equal to `value` from the list at `key`.
    pub fn remove_from_list(&self, key: &str, value: &Value) -> Result<()> {
        let mut map = self.inner.lock();
        match map.get_mut(key) {
            Some(CacheValue::List(items)) => match items.iter().position(|item| item == value) {
                Some(index) => {
                    items.remove(index);
                    debug!(key = %key, len = items.len(), "Removed value from list");
                    Ok(())
                }
                None => {
                    debug!(key = %key, "Value not present in list");
                    Err(Error::ValueNotInList(key.to_string()))
                }
            },
            Some(_) => Err(Error::NotAList(key.to_string())),
            None => Err(Error::NotFound(key.to_string())),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Snapshot of all keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Count entries by shape.
    pub fn stats(&self) -> CacheStats {
        let map = self.inner.lock();
        let mut stats = CacheStats {
            entries: map.len(),
            ..CacheStats::default()
        };
        for value in map.values() {
            match value {
                CacheValue::Record(_) => stats.records += 1,
                CacheValue::List(_) => stats.lists += 1,
                CacheValue::Other(_) => stats.other += 1,
            }
        }
        stats
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of keys.
    pub entries: usize,

    /// Keys holding interview records.
    pub records: usize,

    /// Keys holding lists.
    pub lists: usize,

    /// Keys holding any other value.
    pub other: usize,
}

/// Append under an already held lock.
fn push_to_list(map: &mut HashMap<String, CacheValue>, key: &str, value: Value) -> Result<usize> {
    match map.get_mut(key) {
        Some(CacheValue::List(items)) => {
            items.push(value);
            debug!(key = %key, len = items.len(), "Appended value to list");
            Ok(items.len())
        }
        Some(other) => {
            debug!(key = %key, kind = other.kind(), "Refusing to append to non-list");
            Err(Error::NotAList(key.to_string()))
        }
        None => {
            map.insert(key.to_string(), CacheValue::List(vec![value]));
            debug!(key = %key, "Created new list");
            Ok(1)
        }
    }
}
