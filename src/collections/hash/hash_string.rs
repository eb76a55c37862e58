//! `HashString`: a chaining table keyed by strings.
//!
//! Keys are stored as owned `String`s and looked up by `&str`. Buckets come
//! from [`hash_str`], the Bernstein (djb2) string hash.

use super::table::{ChainTable, Iter, IterMut};
use crate::alloc::constants::DEFAULT_STRING_SIZE;
use core::fmt;
use core::ops::Index;
use serde::{Serialize, Serializer};

/// Bernstein's string hash: `h = 5381`, then `h = h * 33 + byte` for every
/// byte, in wrapping 32-bit arithmetic.
///
/// ```rust
/// assert_eq!(oz_core::collections::hash_str(""), 5381);
/// assert_eq!(oz_core::collections::hash_str("a"), 5381 * 33 + 97);
/// ```
#[inline]
pub fn hash_str(s: &str) -> u32 {
    s.bytes()
        .fold(5381u32, |h, b| h.wrapping_mul(33).wrapping_add(u32::from(b)))
}

/// Fixed-size hash table from string keys to `V`.
pub struct HashString<V, const SIZE: usize = { DEFAULT_STRING_SIZE }> {
    table: ChainTable<String, V, SIZE>,
}

impl<V, const SIZE: usize> HashString<V, SIZE> {
    pub const fn new() -> Self {
        Self {
            table: ChainTable::new(),
        }
    }

    #[inline(always)]
    fn bucket(key: &str) -> usize {
        hash_str(key) as usize % SIZE
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of buckets.
    #[inline]
    pub const fn capacity(&self) -> usize {
        SIZE
    }

    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.find(Self::bucket(key), |k| k == key).is_some()
    }

    pub fn find(&self, key: &str) -> Option<&V> {
        let elem = self.table.find(Self::bucket(key), |k| k == key)?;
        Some(self.table.value(elem))
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut V> {
        let elem = self.table.find(Self::bucket(key), |k| k == key)?;
        Some(self.table.value_mut(elem))
    }

    /// Inserts `value` under `key`, overwriting any previous value.
    pub fn add(&mut self, key: &str, value: V) -> &mut V {
        let bucket = Self::bucket(key);
        match self.table.find(bucket, |k| k == key) {
            Some(elem) => {
                let slot = self.table.value_mut(elem);
                *slot = value;
                slot
            }
            None => self.table.prepend(bucket, key.to_owned(), value),
        }
    }

    /// Inserts `value` only if `key` is absent. Returns the value now stored
    /// under `key`.
    pub fn include(&mut self, key: &str, value: V) -> &mut V {
        let bucket = Self::bucket(key);
        match self.table.find(bucket, |k| k == key) {
            Some(elem) => self.table.value_mut(elem),
            None => self.table.prepend(bucket, key.to_owned(), value),
        }
    }

    /// Removes `key`. Returns whether it was present.
    pub fn exclude(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.table
            .unlink(Self::bucket(key), |k| k == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> Iter<'_, String, V, SIZE> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, String, V, SIZE> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Drops every entry, keys included. The pool keeps its blocks.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Releases the node pool. The table must be empty.
    pub fn dealloc(&mut self) {
        self.table.dealloc();
    }

    /// Moves the contents out, leaving an empty table behind.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

impl<U, const SIZE: usize> HashString<*mut U, SIZE> {
    /// Drops the boxed object behind every value, then empties the table and
    /// releases its pool.
    ///
    /// # Safety
    /// Every value must come from `Box::into_raw` and not be owned elsewhere.
    pub unsafe fn free(&mut self) {
        self.table.drain_with(|_, value| drop(Box::from_raw(value)));
        self.table.dealloc();
    }
}

impl<V, const SIZE: usize> Default for HashString<V, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// The copy holds the same entries, but each bucket's chain is reversed.
impl<V: Clone, const SIZE: usize> Clone for HashString<V, SIZE> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone_reversed(),
        }
    }
}

impl<V: PartialEq, const SIZE: usize> PartialEq for HashString<V, SIZE> {
    fn eq(&self, other: &Self) -> bool {
        self.table.chains_equal(&other.table)
    }
}

impl<V, const SIZE: usize> Index<&str> for HashString<V, SIZE> {
    type Output = V;

    fn index(&self, key: &str) -> &V {
        match self.find(key) {
            Some(value) => value,
            None => panic!("HashString: key {key:?} not found"),
        }
    }
}

impl<K: AsRef<str>, V, const SIZE: usize> Extend<(K, V)> for HashString<V, SIZE> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key.as_ref(), value);
        }
    }
}

impl<K: AsRef<str>, V, const SIZE: usize> FromIterator<(K, V)> for HashString<V, SIZE> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a, V, const SIZE: usize> IntoIterator for &'a HashString<V, SIZE> {
    type Item = (&'a String, &'a V);
    type IntoIter = Iter<'a, String, V, SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, const SIZE: usize> fmt::Debug for HashString<V, SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: Serialize, const SIZE: usize> Serialize for HashString<V, SIZE> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
