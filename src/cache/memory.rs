//! Unbounded Map Store
//!
//! A concurrency-safe key/value cache over a growable hash table. Size is
//! unconstrained; entries leave only by TTL, delete or flush.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::builder::StoreParts;
use crate::cache::entry::{Entry, Lookup};
use crate::cache::stats::CacheStats;
use crate::cache::storage::Storage;
use crate::cache::table::Shared;
use crate::cache::traits::{CacheKey, Cacheable};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_reaper, ReaperHandle};

/// Upper bound on the slots reserved up front from a configured size.
const MAX_PREALLOCATED: usize = 1024;

type MapTable<K, V> = HashMap<K, Entry<V>>;

// == Memory Store ==
/// Unbounded TTL cache guarded by a single reader/writer lock.
///
/// Expired entries are hidden from every read immediately and physically
/// removed either by a best-effort background removal triggered from the
/// read, or by the periodic reaper, whichever comes first.
///
/// The handle is not `Clone`; share it behind an `Arc`. Dropping it stops the
/// reaper.
pub struct MemoryStore<K, V> {
    shared: Arc<Shared<MapTable<K, V>>>,
    reaper: ReaperHandle,
}

/// Loosely-typed store holding arbitrary JSON values.
pub type AnyMemoryStore = MemoryStore<String, serde_json::Value>;

impl<K: CacheKey, V: Cacheable> MemoryStore<K, V> {
    // == Constructor ==
    /// Creates a store with default options and the process-wide clock.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime. Use
    /// [`StoreBuilder`](crate::cache::StoreBuilder) to get an error instead.
    pub fn new() -> Self {
        Self::from_parts(StoreParts::defaults())
    }

    pub(crate) fn from_parts(parts: StoreParts<K, V>) -> Self {
        let hint = parts.size.unwrap_or(0).min(MAX_PREALLOCATED);
        let mut data = HashMap::with_capacity(hint.max(parts.data.len()));
        data.extend(parts.data);

        let shared = Shared::new(data, parts.clock, "memory");
        let reaper = spawn_reaper(&shared, parts.gc_interval, "memory");

        Self { shared, reaper }
    }

    // == Length ==
    /// Number of entries physically held, expired-but-unreaped ones included.
    pub async fn len(&self) -> usize {
        self.shared.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.len().await == 0
    }

    /// Copies every live entry.
    pub async fn snapshot(&self) -> HashMap<K, Entry<V>> {
        self.shared.snapshot().await
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.shared.stats().await
    }

    /// Stops the background reaper. Operations after `close` still work on
    /// the table but nothing sweeps it any more.
    pub fn close(&self) {
        self.reaper.stop();
        debug!("memory store closed");
    }
}

impl<K: CacheKey, V: Cacheable> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CacheKey, V: Cacheable> Storage<K, V> for MemoryStore<K, V> {
    async fn set(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        if key.is_blank() || value.is_absent() {
            return Ok(());
        }

        let entry = Entry::with_ttl(value, self.shared.clock.timestamp(), ttl);
        self.shared.data.write().await.insert(key, entry);
        Ok(())
    }

    async fn get(&self, key: &K) -> Result<V> {
        let now = self.shared.clock.timestamp();
        let lookup = Lookup::of(self.shared.data.read().await.get(key), now);

        match lookup {
            Lookup::Live(value) => {
                self.shared.stats.record_hit();
                Ok(value)
            }
            Lookup::Expired => {
                self.shared.stats.record_expired();
                self.shared.schedule_removal(key);
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
        "memory"
    }
}

impl<K, V> fmt::Display for MemoryStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory")
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::builder::StoreBuilder;
    use crate::cache::clock::ManualClock;
    use serde_json::json;

    const START: i64 = 1_700_000_000;

    fn store_with_clock(gc_interval: Duration) -> (MemoryStore<String, String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let store = StoreBuilder::new()
            .gc_interval(gc_interval)
            .clock(clock.clone())
            .build_memory()
            .unwrap();
        (store, clock)
    }

    fn test_store() -> (MemoryStore<String, String>, Arc<ManualClock>) {
        store_with_clock(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_store_new() {
        let store: MemoryStore<String, String> = MemoryStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.to_string(), "memory");
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let (store, _) = test_store();

        store.set("key1".to_string(), "value1".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get(&"key1".to_string()).await, Ok("value1".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let (store, _) = test_store();
        assert_eq!(store.get(&"nonexistent".to_string()).await, Err(CacheError::KeyNotExist));
    }

    #[tokio::test]
    async fn test_store_blank_key_and_absent_value_ignored() {
        let (store, _) = test_store();

        store.set(String::new(), "value".to_string(), Duration::ZERO).await.unwrap();
        store.set("key".to_string(), String::new(), Duration::ZERO).await.unwrap();
        assert_eq!(store.len().await, 1);

        let json_store: AnyMemoryStore = StoreBuilder::new().build_memory().unwrap();
        json_store.set("k".to_string(), json!(null), Duration::ZERO).await.unwrap();
        assert!(json_store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_overwrite_replaces_ttl() {
        let (store, clock) = test_store();
        let key = "key1".to_string();

        store.set(key.clone(), "value1".to_string(), Duration::from_secs(1)).await.unwrap();
        store.set(key.clone(), "value2".to_string(), Duration::ZERO).await.unwrap();
        clock.advance(Duration::from_secs(10));

        assert_eq!(store.get(&key).await, Ok("value2".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let (store, clock) = test_store();
        let key = "key1".to_string();

        store.set(key.clone(), "value1".to_string(), Duration::from_secs(1)).await.unwrap();
        assert!(store.get(&key).await.is_ok());

        clock.advance(Duration::from_secs(1));

        assert_eq!(store.get(&key).await, Err(CacheError::ItemExpired));
        assert!(!store.contains(&key).await);
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_no_expiry_sentinel() {
        let (store, clock) = test_store();
        let key = "forever".to_string();

        store.set(key.clone(), "v".to_string(), Duration::ZERO).await.unwrap();
        clock.advance(Duration::from_secs(10 * 365 * 24 * 3600));

        assert_eq!(store.get(&key).await, Ok("v".to_string()));
    }

    #[tokio::test]
    async fn test_store_expired_read_removes_lazily() {
        let (store, clock) = test_store();
        let key = "key1".to_string();

        store.set(key.clone(), "value1".to_string(), Duration::from_secs(1)).await.unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(store.get(&key).await, Err(CacheError::ItemExpired));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.len().await, 0);
        assert_eq!(store.get(&key).await, Err(CacheError::KeyNotExist));
    }

    #[tokio::test]
    async fn test_store_lazy_removal_spares_refreshed_entry() {
        let (store, clock) = test_store();
        let key = "key1".to_string();

        store.set(key.clone(), "old".to_string(), Duration::from_secs(1)).await.unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(store.get(&key).await, Err(CacheError::ItemExpired));
        // Lands before the scheduled removal gets to run.
        store.set(key.clone(), "new".to_string(), Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get(&key).await, Ok("new".to_string()));
    }

    #[tokio::test]
    async fn test_store_delete_is_permissive() {
        let (store, _) = test_store();
        let key = "key1".to_string();

        store.set(key.clone(), "value1".to_string(), Duration::ZERO).await.unwrap();
        assert!(store.delete(&key).await.is_ok());
        assert!(store.delete(&key).await.is_ok());
        assert_eq!(store.get(&key).await, Err(CacheError::KeyNotExist));
    }

    #[tokio::test]
    async fn test_store_deletes_counts_removed() {
        let (store, _) = test_store();
        let k1 = "k1".to_string();
        let k2 = "k2".to_string();
        let missing = "missing".to_string();

        store.set(k1.clone(), "1".to_string(), Duration::ZERO).await.unwrap();
        store.set(k2.clone(), "2".to_string(), Duration::ZERO).await.unwrap();

        assert_eq!(store.deletes(&[k1.clone(), k2.clone(), missing.clone()]).await, Ok(2));
        assert_eq!(store.deletes(&[]).await, Ok(0));
        for key in [&k1, &k2, &missing] {
            assert!(!store.contains(key).await);
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_flush() {
        let (store, _) = test_store();

        for i in 0..5 {
            store.set(format!("k{i}"), "v".to_string(), Duration::ZERO).await.unwrap();
        }
        store.flush().await.unwrap();
        store.flush().await.unwrap();

        assert!(store.keys().await.is_empty());
        assert_eq!(store.get(&"k0".to_string()).await, Err(CacheError::KeyNotExist));
    }

    #[tokio::test]
    async fn test_store_keys_only_live() {
        let (store, clock) = test_store();

        store.set("short".to_string(), "v".to_string(), Duration::from_secs(1)).await.unwrap();
        store.set("long".to_string(), "v".to_string(), Duration::from_secs(100)).await.unwrap();
        store.set("forever".to_string(), "v".to_string(), Duration::ZERO).await.unwrap();
        clock.advance(Duration::from_secs(5));

        let mut keys = store.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["forever".to_string(), "long".to_string()]);
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_store_get_any() {
        let (store, clock) = test_store();
        let key = "key1".to_string();

        assert!(store.get_any(&key).await.key_not_found());

        store.set(key.clone(), "value1".to_string(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.get_any(&key).await.into_value(), Some("value1".to_string()));

        clock.advance(Duration::from_secs(1));
        assert!(store.get_any(&key).await.is_expired());
    }

    #[tokio::test]
    async fn test_store_reaper_removes_unread_entries() {
        let (store, clock) = store_with_clock(Duration::from_millis(30));

        for i in 0..10 {
            store.set(format!("k{i}"), "v".to_string(), Duration::from_secs(1)).await.unwrap();
        }
        store.set("keep".to_string(), "v".to_string(), Duration::ZERO).await.unwrap();
        clock.advance(Duration::from_secs(2));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.len().await, 1);
        let stats = store.stats().await;
        assert_eq!(stats.reaped, 10);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_store_seeded_data() {
        let clock = Arc::new(ManualClock::new(START));
        let mut seed = HashMap::new();
        seed.insert("live".to_string(), Entry::new(1u32, START + 10));
        seed.insert("stale".to_string(), Entry::new(2u32, START - 10));

        let store = StoreBuilder::new().clock(clock).data(seed).build_memory().unwrap();

        assert_eq!(store.get(&"live".to_string()).await, Ok(1));
        assert_eq!(store.get(&"stale".to_string()).await, Err(CacheError::ItemExpired));
    }

    #[tokio::test]
    async fn test_store_stats() {
        let (store, clock) = test_store();

        store.set("key1".to_string(), "v".to_string(), Duration::from_secs(1)).await.unwrap();
        store.get(&"key1".to_string()).await.unwrap();
        let _ = store.get(&"nonexistent".to_string()).await;
        clock.advance(Duration::from_secs(1));
        let _ = store.get(&"key1".to_string()).await;

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_store_close_stops_reaper() {
        let (store, clock) = store_with_clock(Duration::from_millis(20));

        store.close();
        store.set("k".to_string(), "v".to_string(), Duration::from_secs(1)).await.unwrap();
        clock.advance(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_huge_size_hint_builds() {
        let store: MemoryStore<String, String> = StoreBuilder::new().size(usize::MAX).build_memory().unwrap();

        store.set("k".to_string(), "v".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(store.get(&"k".to_string()).await, Ok("v".to_string()));
    }

    #[tokio::test]
    async fn test_store_seed_skips_blank_keys_and_absent_values() {
        let mut seed = HashMap::new();
        seed.insert(String::new(), Entry::persistent(json!("v")));
        seed.insert("null".to_string(), Entry::persistent(json!(null)));
        seed.insert("empty".to_string(), Entry::persistent(json!("")));

        let store: AnyMemoryStore = StoreBuilder::new().data(seed).build_memory().unwrap();

        assert_eq!(store.keys().await, vec!["empty".to_string()]);
        assert_eq!(store.get(&String::new()).await, Err(CacheError::KeyNotExist));
        assert!(!store.contains(&String::new()).await);
        assert!(store.get_any(&"null".to_string()).await.key_not_found());
    }
}
