//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a store.
//!
//! # Tasks
//! - Reaper: Removes TTL-expired entries at a fixed interval

mod reaper;

pub use reaper::{spawn_reaper, sweep, Reap, ReaperHandle};
