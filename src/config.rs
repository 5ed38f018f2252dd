//! Configuration Module
//!
//! Construction-time options shared by both store kinds, loadable from
//! environment variables or from an embedding application's own config file.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default interval between background sweeps, in seconds.
pub const DEFAULT_GC_INTERVAL_SECS: u64 = 10;

/// Default capacity of the bounded store.
pub const DEFAULT_SIZE: usize = 1000;

/// Store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Background sweep interval in seconds
    pub gc_interval_secs: u64,
    /// Capacity of the bounded store; initial table capacity of the unbounded one
    pub size: usize,
}

impl StoreConfig {
    /// Creates a new StoreConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_GC_INTERVAL` - Sweep frequency in seconds (default: 10)
    /// - `CACHE_SIZE` - Bounded store capacity (default: 1000)
    ///
    /// Missing or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Strict variant of [`StoreConfig::from_env`]: a variable that is set but
    /// unparsable, or a zero value, is reported instead of replaced.
    pub fn try_from_env() -> Result<Self> {
        Self::try_from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            gc_interval_secs: lookup("CACHE_GC_INTERVAL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_GC_INTERVAL_SECS),
            size: lookup("CACHE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SIZE),
        }
    }

    fn try_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            gc_interval_secs: parse_var(&lookup, "CACHE_GC_INTERVAL", DEFAULT_GC_INTERVAL_SECS)?,
            size: parse_var(&lookup, "CACHE_SIZE", DEFAULT_SIZE)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sweep interval as a `Duration`.
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs)
    }

    /// Rejects values no store can run with.
    pub fn validate(&self) -> Result<()> {
        if self.gc_interval_secs == 0 {
            return Err(CacheError::InvalidConfig(
                "gc interval must be greater than zero".to_string(),
            ));
        }
        if self.size == 0 {
            return Err(CacheError::InvalidConfig(
                "size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidConfig(format!("{name}={raw:?} is not a valid number"))),
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            gc_interval_secs: DEFAULT_GC_INTERVAL_SECS,
            size: DEFAULT_SIZE,
        }
    }
}
