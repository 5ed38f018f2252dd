//! Store Builder
//!
//! Construction options shared by both store kinds.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::cache::bounded::LruStore;
use crate::cache::clock::{CoarseClock, SharedClock};
use crate::cache::entry::Entry;
use crate::cache::memory::MemoryStore;
use crate::cache::traits::{CacheKey, Cacheable};
use crate::config::{StoreConfig, DEFAULT_GC_INTERVAL_SECS, DEFAULT_SIZE};
use crate::error::{CacheError, Result};

/// Everything a store needs at construction, already validated.
pub(crate) struct StoreParts<K, V> {
    pub(crate) gc_interval: Duration,
    pub(crate) size: Option<usize>,
    pub(crate) data: HashMap<K, Entry<V>>,
    pub(crate) clock: SharedClock,
}

impl<K, V> StoreParts<K, V> {
    pub(crate) fn defaults() -> Self {
        Self {
            gc_interval: Duration::from_secs(DEFAULT_GC_INTERVAL_SECS),
            size: None,
            data: HashMap::new(),
            clock: CoarseClock::global(),
        }
    }
}

// == Store Builder ==
/// Configures and builds a [`MemoryStore`] or an [`LruStore`].
///
/// # Example
/// ```ignore
/// let store = StoreBuilder::<String, String>::new()
///     .gc_interval(Duration::from_secs(30))
///     .size(10_000)
///     .build_lru()?;
/// ```
pub struct StoreBuilder<K, V> {
    gc_interval: Duration,
    size: Option<usize>,
    data: HashMap<K, Entry<V>>,
    clock: Option<SharedClock>,
}

impl<K: CacheKey, V: Cacheable> StoreBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            gc_interval: Duration::from_secs(DEFAULT_GC_INTERVAL_SECS),
            size: None,
            data: HashMap::new(),
            clock: None,
        }
    }

    /// Takes the sweep interval and size from a loaded [`StoreConfig`].
    pub fn config(mut self, config: &StoreConfig) -> Self {
        self.gc_interval = config.gc_interval();
        self.size = Some(config.size);
        self
    }

    /// Interval between background sweeps (default 10s).
    pub fn gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = interval;
        self
    }

    /// Capacity of a bounded store (default 1000); initial table capacity of
    /// an unbounded one. Neither store reserves memory for the full size.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Pre-seeds the store. Entries keep their own expiry instants; blank
    /// keys and absent values are dropped, as `set` would.
    pub fn data(mut self, data: HashMap<K, Entry<V>>) -> Self {
        self.data = data;
        self
    }

    /// Replaces the process-wide coarse clock, e.g. with a `ManualClock` in tests.
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    // == Build ==
    /// Builds an unbounded store and starts its reaper.
    pub fn build_memory(self) -> Result<MemoryStore<K, V>> {
        let parts = self.into_parts()?;
        Ok(MemoryStore::from_parts(parts))
    }

    /// Builds a capacity-bounded LRU store and starts its reaper.
    pub fn build_lru(self) -> Result<LruStore<K, V>> {
        let size = self.size.unwrap_or(DEFAULT_SIZE);
        let capacity = NonZeroUsize::new(size).ok_or_else(|| {
            CacheError::InvalidConfig("bounded store size must be greater than zero".to_string())
        })?;
        let parts = self.into_parts()?;
        Ok(LruStore::from_parts(parts, capacity))
    }

    fn into_parts(self) -> Result<StoreParts<K, V>> {
        if self.gc_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "gc interval must be greater than zero".to_string(),
            ));
        }
        Handle::try_current().map_err(|err| CacheError::NoRuntime(err.to_string()))?;

        // Seeds obey the same rules as `set`.
        let mut data = self.data;
        data.retain(|key, entry| !key.is_blank() && !entry.value().is_absent());

        Ok(StoreParts {
            gc_interval: self.gc_interval,
            size: self.size,
            data,
            clock: self.clock.unwrap_or_else(CoarseClock::global),
        })
    }
}

impl<K: CacheKey, V: Cacheable> Default for StoreBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
