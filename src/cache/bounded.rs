//! Bounded LRU Store
//!
//! Same contract and TTL behavior as the unbounded store, plus a hard
//! capacity: inserting a new key into a full store first evicts the least
//! recently used entry.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tracing::debug;

use crate::cache::builder::StoreParts;
use crate::cache::entry::{Entry, Lookup};
use crate::cache::stats::CacheStats;
use crate::cache::storage::Storage;
use crate::cache::table::Shared;
use crate::cache::traits::{CacheKey, Cacheable};
use crate::config::DEFAULT_SIZE;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_reaper, ReaperHandle};

/// Recency-ordered table. Only `get` and `set` touch recency; every other
/// read peeks so maintenance never perturbs eviction order.
///
/// The table itself is unbounded and never preallocates; `capacity` is
/// enforced on insert.
type LruTable<K, V> = LruCache<K, Entry<V>>;

// == LRU Store ==
/// Capacity-bounded TTL cache with least-recently-used eviction.
///
/// Capacity eviction and TTL expiry are independent: an entry leaves by
/// whichever happens first. The table never holds more than `capacity`
/// entries, expired ones included.
pub struct LruStore<K, V> {
    shared: Arc<Shared<LruTable<K, V>>>,
    reaper: ReaperHandle,
    capacity: NonZeroUsize,
}

/// Loosely-typed bounded store holding arbitrary JSON values.
pub type AnyLruStore = LruStore<String, serde_json::Value>;

impl<K: CacheKey, V: Cacheable> LruStore<K, V> {
    // == Constructor ==
    /// Creates a store holding at most 1000 entries.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self::from_parts(StoreParts::defaults(), capacity)
    }

    /// Creates a store holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::from_parts(StoreParts::defaults(), capacity)
    }

    /// Seeded entries go in in the map's iteration order; a seed larger than
    /// `capacity` keeps only the last `capacity` of them.
    pub(crate) fn from_parts(parts: StoreParts<K, V>, capacity: NonZeroUsize) -> Self {
        let mut data = LruCache::unbounded();
        for (key, entry) in parts.data {
            data.put(key, entry);
            if data.len() > capacity.get() {
                data.pop_lru();
            }
        }

        let shared = Shared::new(data, parts.clock, "lru");
        let reaper = spawn_reaper(&shared, parts.gc_interval, "lru");

        Self {
            shared,
            reaper,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of entries physically held, expired-but-unreaped ones included.
    pub async fn len(&self) -> usize {
        self.shared.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.len().await == 0
    }

    /// Copies every live entry without touching recency.
    pub async fn snapshot(&self) -> HashMap<K, Entry<V>> {
        self.shared.snapshot().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.shared.stats().await
    }

    /// Stops the background reaper and drops every entry.
    pub async fn close(&self) {
        self.reaper.stop();
        self.shared.flush().await;
        debug!("lru store closed");
    }
}

impl<K: CacheKey, V: Cacheable> Default for LruStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CacheKey, V: Cacheable> Storage<K, V> for LruStore<K, V> {
    async fn set(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        if key.is_blank() || value.is_absent() {
            return Ok(());
        }

        let entry = Entry::with_ttl(value, self.shared.clock.timestamp(), ttl);
        let mut data = self.shared.data.write().await;
        let evicted = if !data.contains(&key) && data.len() >= self.capacity.get() {
            data.pop_lru().is_some()
        } else {
            false
        };
        data.put(key, entry);

        if evicted {
            self.shared.stats.record_eviction();
            debug!("lru store: capacity reached, evicted least recently used entry");
        }
        Ok(())
    }

    /// A hit marks the key most recently used. An expired entry is dropped on
    /// the spot since the write lock is already held.
    async fn get(&self, key: &K) -> Result<V> {
        let now = self.shared.clock.timestamp();
        let mut data = self.shared.data.write().await;

        match Lookup::of(data.get(key), now) {
            Lookup::Live(value) => {
                self.shared.stats.record_hit();
                Ok(value)
            }
            Lookup::Expired => {
                data.pop(key);
                self.shared.stats.record_expired();
                Err(CacheError::ItemExpired)
            }
            Lookup::Missing => {
                self.shared.stats.record_miss();
                Err(CacheError::KeyNotExist)
            }
        }
    }

    async fn delete(&self, key: &K) -> Result<()> {
        self.shared.delete(key).await;
        Ok(())
    }

    async fn deletes(&self, keys: &[K]) -> Result<u64> {
        Ok(self.shared.deletes(keys).await)
    }

    async fn flush(&self) -> Result<()> {
        self.shared.flush().await;
        Ok(())
    }

    async fn keys(&self) -> Vec<K> {
        self.shared.live_keys().await
    }

    async fn contains(&self, key: &K) -> bool {
        self.shared.contains(key).await
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

impl<K, V> fmt::Display for LruStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("lru")
    }
}
