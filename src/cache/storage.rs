//! Store contract
//!
//! The capability set every cache backend exposes. Callers written against
//! `dyn Storage<K, V>` can be handed the unbounded store, the bounded store or
//! a remote backend interchangeably.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::value::CacheValue;
use crate::error::Result;

/// Uniform cache operations.
///
/// Cancellation follows the usual future semantics: dropping a call's future
/// abandons it. The in-process stores never wait on anything but their own
/// lock, so every call completes promptly.
#[async_trait]
pub trait Storage<K, V>: fmt::Display + Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// A zero `ttl` means the entry never expires. Blank keys and absent
    /// values are ignored rather than rejected.
    async fn set(&self, key: K, value: V, ttl: Duration) -> Result<()>;

    /// Reads a live value.
    ///
    /// # Errors
    /// - `KeyNotExist` if the key is absent
    /// - `ItemExpired` if the key is present but past its TTL
    async fn get(&self, key: &K) -> Result<V>;

    /// Reads a value without surfacing an error; the outcome is kept in the
    /// returned [`CacheValue`].
    async fn get_any(&self, key: &K) -> CacheValue<V> {
        CacheValue::from(self.get(key).await)
    }

    /// Removes `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &K) -> Result<()>;

    /// Removes every listed key that exists and returns how many were removed.
    async fn deletes(&self, keys: &[K]) -> Result<u64>;

    /// Drops every entry.
    async fn flush(&self) -> Result<()>;

    /// Lists the keys that are live right now.
    async fn keys(&self) -> Vec<K>;

    /// True iff `key` is present and not expired.
    async fn contains(&self, key: &K) -> bool;

    /// Short backend name, also used for `Display`.
    fn name(&self) -> &'static str;
}
