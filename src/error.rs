//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for every cache backend.
///
/// The in-process stores only ever produce [`CacheError::KeyNotExist`] and
/// [`CacheError::ItemExpired`] from data operations. The `*Failed` variants
/// exist for backends whose underlying operation can fail (a remote store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("key not found in cache")]
    KeyNotExist,

    /// Key is present but its TTL has elapsed
    #[error("item has expired")]
    ItemExpired,

    /// Backend failed to delete the key
    #[error("delete key failed: {0}")]
    DeleteKeyFailed(String),

    /// Backend failed to store the key
    #[error("set key failed: {0}")]
    SetKeyFailed(String),

    /// Store options are unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stores spawn their reaper on Tokio and must be built inside a runtime
    #[error("no Tokio runtime available: {0}")]
    NoRuntime(String),

    /// A wrapped value could not be read as the requested type
    #[error("invalid type: expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: String,
    },
}

impl CacheError {
    /// Returns true for [`CacheError::KeyNotExist`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotExist)
    }

    /// Returns true for [`CacheError::ItemExpired`].
    pub fn is_expired(&self) -> bool {
        matches!(self, CacheError::ItemExpired)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
