//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `expires_at` value meaning "never expires".
pub const NO_EXPIRY: i64 = 0;

// == Cache Entry ==
/// A stored value paired with its absolute expiry instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix seconds), `NO_EXPIRY` = no expiration
    pub expires_at: i64,
}

impl<V> Entry<V> {
    // == Constructors ==
    pub fn new(value: V, expires_at: i64) -> Self {
        Self { value, expires_at }
    }

    /// An entry that never expires.
    pub fn persistent(value: V) -> Self {
        Self::new(value, NO_EXPIRY)
    }

    /// An entry living `ttl` from `now`; a zero `ttl` never expires.
    pub fn with_ttl(value: V, now: i64, ttl: Duration) -> Self {
        Self::new(value, expires_at_for(now, ttl))
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches `expires_at`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at != NO_EXPIRY && self.expires_at <= now
    }

    /// Stricter check used by the sweep: the expiry instant lies strictly in the past.
    pub fn expired_before(&self, now: i64) -> bool {
        self.expires_at != NO_EXPIRY && self.expires_at < now
    }

    // == Time To Live ==
    /// Returns remaining TTL at `now`, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self, now: i64) -> Option<Duration> {
        if self.expires_at == NO_EXPIRY {
            return None;
        }
        let remaining = u64::try_from(self.expires_at.saturating_sub(now)).unwrap_or(0);
        Some(Duration::from_secs(remaining))
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

/// Computes the absolute expiry for a TTL starting at `now`.
///
/// TTLs are kept in whole seconds. A sub-second remainder rounds up, so any
/// positive TTL outlives the second it was set in.
pub fn expires_at_for(now: i64, ttl: Duration) -> i64 {
    if ttl.is_zero() {
        return NO_EXPIRY;
    }
    let mut secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs = secs.saturating_add(1);
    }
    now.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX))
}

/// Outcome of looking an entry up at a given instant.
#[derive(Debug, PartialEq)]
pub(crate) enum Lookup<V> {
    Missing,
    Expired,
    Live(V),
}

impl<V: Clone> Lookup<V> {
    pub(crate) fn of(entry: Option<&Entry<V>>, now: i64) -> Self {
        match entry {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => Lookup::Live(entry.value.clone()),
        }
    }
}
