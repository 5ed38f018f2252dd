//! Cache Module
//!
//! Key/value stores with per-entry TTL expiration, in an unbounded flavor and
//! a capacity-bounded LRU flavor, both behind the [`Storage`] contract.

mod bounded;
mod builder;
mod clock;
mod entry;
mod memory;
mod stats;
mod storage;
mod table;
mod traits;
mod value;


// Re-export public types
pub use bounded::{AnyLruStore, LruStore};
pub use builder::StoreBuilder;
pub use clock::{Clock, CoarseClock, ManualClock, SharedClock};
pub use entry::{expires_at_for, Entry, NO_EXPIRY};
pub use memory::{AnyMemoryStore, MemoryStore};
pub use stats::CacheStats;
pub use storage::Storage;
pub use traits::{Absent, Blank, CacheKey, Cacheable};
pub use value::CacheValue;
