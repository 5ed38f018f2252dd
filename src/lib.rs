//! kvcache - An embeddable in-process key/value cache
//!
//! Provides TTL expiration on a coarse once-per-second clock, an unbounded
//! store and a capacity-bounded LRU store, both swept by a background reaper.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use kvcache::{Storage, StoreBuilder};
//!
//! # async fn run() -> kvcache::Result<()> {
//! let store = StoreBuilder::<String, String>::new().size(100).build_lru()?;
//! store.set("greeting".to_string(), "hello".to_string(), Duration::from_secs(60)).await?;
//! assert_eq!(store.get(&"greeting".to_string()).await?, "hello");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{
    AnyLruStore, AnyMemoryStore, CacheStats, CacheValue, Entry, LruStore, MemoryStore, Storage,
    StoreBuilder,
};
pub use config::StoreConfig;
pub use error::{CacheError, Result};
