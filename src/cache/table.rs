//! Shared Table State
//!
//! Both stores keep their entries in a [`Table`] behind one reader/writer
//! lock, next to a clock and hit counters. Everything that only inspects
//! entries without reordering them (expiry checks, lazy removal, sweeps,
//! listings) is written once here against that trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::clock::SharedClock;
use crate::cache::entry::Entry;
use crate::cache::stats::{CacheStats, StatsCounter};
use crate::cache::traits::{Blank, CacheKey, Cacheable};
use crate::tasks::Reap;

/// A keyed collection of entries.
///
/// `peek_entry` and `entries` must not affect eviction order.
pub(crate) trait Table: Send + Sync + 'static {
    type Key: CacheKey;
    type Value: Cacheable;

    fn peek_entry(&self, key: &Self::Key) -> Option<&Entry<Self::Value>>;

    fn take_entry(&mut self, key: &Self::Key) -> Option<Entry<Self::Value>>;

    fn entries(&self) -> Box<dyn Iterator<Item = (&Self::Key, &Entry<Self::Value>)> + '_>;

    fn entry_count(&self) -> usize;

    fn clear_entries(&mut self);
}

impl<K: CacheKey, V: Cacheable> Table for HashMap<K, Entry<V>> {
    type Key = K;
    type Value = V;

    fn peek_entry(&self, key: &K) -> Option<&Entry<V>> {
        self.get(key)
    }

    fn take_entry(&mut self, key: &K) -> Option<Entry<V>> {
        self.remove(key)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &Entry<V>)> + '_> {
        Box::new(self.iter())
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    /// Drops the allocation too, not just the entries.
    fn clear_entries(&mut self) {
        *self = HashMap::new();
    }
}

impl<K: CacheKey, V: Cacheable> Table for LruCache<K, Entry<V>> {
    type Key = K;
    type Value = V;

    fn peek_entry(&self, key: &K) -> Option<&Entry<V>> {
        self.peek(key)
    }

    fn take_entry(&mut self, key: &K) -> Option<Entry<V>> {
        self.pop(key)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &Entry<V>)> + '_> {
        Box::new(self.iter())
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn clear_entries(&mut self) {
        self.clear();
    }
}

// == Shared State ==
/// State shared between a store handle, its reaper and lazy removals.
pub(crate) struct Shared<T> {
    pub(crate) data: RwLock<T>,
    pub(crate) clock: SharedClock,
    pub(crate) stats: StatsCounter,
    label: &'static str,
}

impl<T: Table> Shared<T> {
    pub(crate) fn new(data: T, clock: SharedClock, label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            data: RwLock::new(data),
            clock,
            stats: StatsCounter::default(),
            label,
        })
    }

    /// Removes `key` only if it is still expired, so a fresh `set` that landed
    /// in between is left alone.
    async fn remove_if_expired(&self, key: &T::Key) {
        let now = self.clock.timestamp();
        let mut data = self.data.write().await;
        if data.peek_entry(key).is_some_and(|entry| entry.is_expired(now)) {
            data.take_entry(key);
            debug!(store = self.label, "lazily removed expired entry");
        }
    }

    /// Hands the key to a detached task that removes it if still expired.
    ///
    /// Best-effort: no retry and no error reporting. The reaper converges the
    /// table regardless, and a `set` racing ahead of the task simply wins.
    pub(crate) fn schedule_removal(self: &Arc<Self>, key: &T::Key) {
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let shared = Arc::clone(self);
        let key = key.clone();
        runtime.spawn(async move {
            shared.remove_if_expired(&key).await;
        });
    }

    /// Number of entries physically held, expired-but-unreaped ones included.
    pub(crate) async fn len(&self) -> usize {
        self.data.read().await.entry_count()
    }

    pub(crate) async fn live_keys(&self) -> Vec<T::Key> {
        let now = self.clock.timestamp();
        let data = self.data.read().await;
        data.entries()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub(crate) async fn snapshot(&self) -> HashMap<T::Key, Entry<T::Value>> {
        let now = self.clock.timestamp();
        let data = self.data.read().await;
        data.entries()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    /// True iff `key` is live; an expired hit schedules its removal.
    pub(crate) async fn contains(self: &Arc<Self>, key: &T::Key) -> bool {
        if key.is_blank() {
            return false;
        }

        let now = self.clock.timestamp();
        let expired = match self.data.read().await.peek_entry(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            self.schedule_removal(key);
        }
        !expired
    }

    pub(crate) async fn delete(&self, key: &T::Key) {
        self.data.write().await.take_entry(key);
    }

    pub(crate) async fn deletes(&self, keys: &[T::Key]) -> u64 {
        if keys.is_empty() {
            return 0;
        }

        let mut data = self.data.write().await;
        keys.iter().filter(|key| data.take_entry(*key).is_some()).count() as u64
    }

    pub(crate) async fn flush(&self) {
        self.data.write().await.clear_entries();
        debug!(store = self.label, "flushed");
    }

    pub(crate) async fn stats(&self) -> CacheStats {
        let total = self.len().await;
        self.stats.snapshot(total)
    }
}

#[async_trait]
impl<T: Table> Reap for Shared<T> {
    type Key = T::Key;

    fn now(&self) -> i64 {
        self.clock.timestamp()
    }

    async fn collect_expired(&self, now: i64) -> Vec<T::Key> {
        let data = self.data.read().await;
        data.entries()
            .filter(|(_, entry)| entry.expired_before(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    async fn remove_expired(&self, keys: Vec<T::Key>, now: i64) -> usize {
        let mut data = self.data.write().await;
        let mut removed = 0;
        for key in keys {
            if data.peek_entry(&key).is_some_and(|entry| entry.is_expired(now)) {
                data.take_entry(&key);
                removed += 1;
            }
        }
        self.stats.record_reaped(removed);
        removed
    }
}
