//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use kvcache::cache::ManualClock;
use kvcache::{LruStore, MemoryStore, StoreBuilder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const START: i64 = 1_700_000_000;

/// Installs a fmt subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kvcache=debug")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(START))
}

pub fn memory_store(clock: &Arc<ManualClock>, gc_interval: Duration) -> MemoryStore<String, String> {
    StoreBuilder::new()
        .gc_interval(gc_interval)
        .clock(clock.clone())
        .build_memory()
        .expect("memory store")
}

pub fn lru_store(clock: &Arc<ManualClock>, capacity: usize, gc_interval: Duration) -> LruStore<String, String> {
    StoreBuilder::new()
        .size(capacity)
        .gc_interval(gc_interval)
        .clock(clock.clone())
        .build_lru()
        .expect("lru store")
}
