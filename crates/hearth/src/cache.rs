//! Production output cache
//!
//! In production a site is treated as immutable for the lifetime of the
//! process, so anything computed from it can be kept. In development every
//! lookup recomputes, which picks up edits immediately.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::trace;

use crate::config::Mode;

/// A key-value store backing a [`ContentCache`].
pub trait CacheStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    fn put(&self, key: String, value: V);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entry limit of the store behind [`ContentCache::new`].
///
/// Keys include request data (the `Host` header, post paths), so the number of
/// distinct keys is not bounded by the site.
pub const DEFAULT_CAPACITY: usize = 4096;

/// In-process store.
///
/// Once `capacity` entries are held, new keys are dropped and their values
/// are recomputed on every lookup. Existing keys can still be replaced.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
    capacity: Option<usize>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: None,
        }
    }
}

impl<V> MemoryStore<V> {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }
}

impl<V: Clone + Send + Sync> CacheStore<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn put(&self, key: String, value: V) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if self.capacity.is_some_and(|max| entries.len() >= max) && !entries.contains_key(&key) {
            trace!(key = %key, "Cache full, not storing");
            return;
        }
        entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Mode-aware memoisation over a [`CacheStore`].
pub struct ContentCache<V> {
    mode: Mode,
    store: Box<dyn CacheStore<V>>,
}

impl<V: Clone + Send + Sync + 'static> ContentCache<V> {
    /// Cache backed by a [`MemoryStore`] of [`DEFAULT_CAPACITY`] entries.
    pub fn new(mode: Mode) -> Self {
        Self::with_store(mode, Box::new(MemoryStore::with_capacity(DEFAULT_CAPACITY)))
    }

    pub fn with_store(mode: Mode, store: Box<dyn CacheStore<V>>) -> Self {
        Self { mode, store }
    }

    /// Return the stored value for `key`, or compute it.
    ///
    /// The computed value is stored only in production. Concurrent misses may
    /// both compute, and the later insert wins.
    pub fn get_or_insert_with<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if !self.mode.is_production() {
            return compute();
        }
        if let Some(value) = self.store.get(key) {
            trace!(key, "Cache hit");
            return Ok(value);
        }
        let value = compute()?;
        self.store.put(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
