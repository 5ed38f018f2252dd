//! Key and value bounds shared by every store.
//!
//! `set` silently ignores a blank key or an absent value instead of erroring.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

/// Marks keys that cannot name an entry, such as the empty string.
pub trait Blank {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for &str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Box<str> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Arc<str> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Marks values that stand for "nothing", such as `None` or a JSON `null`.
pub trait Absent {
    fn is_absent(&self) -> bool {
        false
    }
}

impl<T> Absent for Option<T> {
    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl Absent for serde_json::Value {
    fn is_absent(&self) -> bool {
        self.is_null()
    }
}

// Empty strings and collections are values like any other.
impl Absent for String {}
impl Absent for &'static str {}
impl Absent for Box<str> {}
impl<T> Absent for Vec<T> {}
impl<T: ?Sized> Absent for Arc<T> {}
impl<K, V, S> Absent for HashMap<K, V, S> {}
impl<K, V> Absent for BTreeMap<K, V> {}

macro_rules! plain_scalars {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Blank for $ty {}
            impl Absent for $ty {}
        )*
    };
}

plain_scalars!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char);

impl Absent for f32 {}
impl Absent for f64 {}

/// Anything usable as a cache key.
pub trait CacheKey: Hash + Eq + Clone + Blank + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Hash + Eq + Clone + Blank + Send + Sync + 'static {}

/// Anything storable as a cache value. Reads hand out clones.
pub trait Cacheable: Clone + Absent + Send + Sync + 'static {}

impl<T> Cacheable for T where T: Clone + Absent + Send + Sync + 'static {}
