//! Wrapped read results.
//!
//! [`CacheValue`] is what `get_any` hands back: the outcome of a read kept as
//! data so the call site can decide later how to treat a miss. For the dynamic
//! instantiation (`serde_json::Value` values) it also offers typed extraction.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CacheError, Result};

/// A value-or-error read from a cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheValue<V> {
    result: Result<V>,
}

impl<V> CacheValue<V> {
    pub fn found(value: V) -> Self {
        Self { result: Ok(value) }
    }

    pub fn failed(error: CacheError) -> Self {
        Self { result: Err(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// True when the key was never set or is already gone.
    pub fn key_not_found(&self) -> bool {
        matches!(self.result, Err(CacheError::KeyNotExist))
    }

    /// True when the key was present but past its TTL.
    pub fn is_expired(&self) -> bool {
        matches!(self.result, Err(CacheError::ItemExpired))
    }

    pub fn value(&self) -> Option<&V> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&CacheError> {
        self.result.as_ref().err()
    }

    pub fn into_value(self) -> Option<V> {
        self.result.ok()
    }

    pub fn value_or(self, default: V) -> V {
        self.result.unwrap_or(default)
    }

    pub fn into_result(self) -> Result<V> {
        self.result
    }
}

impl<V> From<Result<V>> for CacheValue<V> {
    fn from(result: Result<V>) -> Self {
        Self { result }
    }
}

// == Typed extraction for dynamic values ==
impl CacheValue<Value> {
    fn json(&self) -> Result<&Value> {
        self.result.as_ref().map_err(Clone::clone)
    }

    pub fn as_i64(&self) -> Result<i64> {
        let value = self.json()?;
        value.as_i64().ok_or_else(|| invalid("i64", value))
    }

    pub fn as_u64(&self) -> Result<u64> {
        let value = self.json()?;
        value.as_u64().ok_or_else(|| invalid("u64", value))
    }

    pub fn as_f64(&self) -> Result<f64> {
        let value = self.json()?;
        value.as_f64().ok_or_else(|| invalid("f64", value))
    }

    pub fn as_bool(&self) -> Result<bool> {
        let value = self.json()?;
        value.as_bool().ok_or_else(|| invalid("bool", value))
    }

    pub fn as_str(&self) -> Result<&str> {
        let value = self.json()?;
        value.as_str().ok_or_else(|| invalid("string", value))
    }

    /// Like [`CacheValue::as_str`] but also renders numbers and booleans.
    pub fn as_string(&self) -> Result<String> {
        match self.json()? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(invalid("string", other)),
        }
    }

    pub fn i64_or(&self, default: i64) -> i64 {
        self.as_i64().unwrap_or(default)
    }

    pub fn u64_or(&self, default: u64) -> u64 {
        self.as_u64().unwrap_or(default)
    }

    pub fn f64_or(&self, default: f64) -> f64 {
        self.as_f64().unwrap_or(default)
    }

    pub fn bool_or(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    pub fn string_or(&self, default: &str) -> String {
        self.as_string().unwrap_or_else(|_| default.to_string())
    }

    /// Deserializes the stored JSON into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.json()?;
        serde_json::from_value(value.clone()).map_err(|err| CacheError::InvalidType {
            expected: std::any::type_name::<T>(),
            found: err.to_string(),
        })
    }
}

fn invalid(expected: &'static str, found: &Value) -> CacheError {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    CacheError::InvalidType {
        expected,
        found: kind.to_string(),
    }
}
