//! `HashIndex`: a chaining table keyed by `i32`.
//!
//! The bucket of a key is `key as u32 % SIZE`. There is no mixing, so keys
//! should be spread reasonably evenly; a prime `SIZE` keeps sequential and
//! strided keys from piling into a few buckets.

use super::table::{ChainTable, Iter, IterMut};
use crate::alloc::constants::DEFAULT_INDEX_SIZE;
use core::fmt;
use core::ops::Index;
use serde::{Serialize, Serializer};

/// Fixed-size hash table from `i32` keys to `V`.
pub struct HashIndex<V, const SIZE: usize = { DEFAULT_INDEX_SIZE }> {
    table: ChainTable<i32, V, SIZE>,
}

impl<V, const SIZE: usize> HashIndex<V, SIZE> {
    pub const fn new() -> Self {
        Self {
            table: ChainTable::new(),
        }
    }

    #[inline(always)]
    fn bucket(key: i32) -> usize {
        key as u32 as usize % SIZE
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

    /// Entries per bucket.
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn contains(&self, key: i32) -> bool {
        self.table.find(Self::bucket(key), |k| *k == key).is_some()
    }

    pub fn find(&self, key: i32) -> Option<&V> {
        let elem = self.table.find(Self::bucket(key), |k| *k == key)?;
        Some(self.table.value(elem))
    }

    pub fn find_mut(&mut self, key: i32) -> Option<&mut V> {
        let elem = self.table.find(Self::bucket(key), |k| *k == key)?;
        Some(self.table.value_mut(elem))
    }

    /// Inserts `value` under `key`, overwriting any previous value.
    pub fn add(&mut self, key: i32, value: V) -> &mut V {
        let bucket = Self::bucket(key);
        match self.table.find(bucket, |k| *k == key) {
            Some(elem) => {
                let slot = self.table.value_mut(elem);
                *slot = value;
                slot
            }
            None => self.table.prepend(bucket, key, value),
        }
    }

    /// Inserts `value` only if `key` is absent. Returns the value now stored
    /// under `key`, which is the old one if it was present.
    pub fn include(&mut self, key: i32, value: V) -> &mut V {
        let bucket = Self::bucket(key);
        match self.table.find(bucket, |k| *k == key) {
            Some(elem) => self.table.value_mut(elem),
            None => self.table.prepend(bucket, key, value),
        }
    }

    /// Removes `key`. Returns whether it was present.
    pub fn exclude(&mut self, key: i32) -> bool {
        self.remove(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: i32) -> Option<V> {
        self.table
            .unlink(Self::bucket(key), |k| *k == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> Iter<'_, i32, V, SIZE> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, i32, V, SIZE> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Drops every entry. The pool keeps its blocks for reuse.
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

impl<U, const SIZE: usize> HashIndex<*mut U, SIZE> {
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

impl<V, const SIZE: usize> Default for HashIndex<V, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// The copy holds the same entries, but each bucket's chain is reversed.
impl<V: Clone, const SIZE: usize> Clone for HashIndex<V, SIZE> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone_reversed(),
        }
    }
}

/// Bucket-by-bucket comparison; chain order matters.
impl<V: PartialEq, const SIZE: usize> PartialEq for HashIndex<V, SIZE> {
    fn eq(&self, other: &Self) -> bool {
        self.table.chains_equal(&other.table)
    }
}

impl<V, const SIZE: usize> Index<i32> for HashIndex<V, SIZE> {
    type Output = V;

    /// # Panics
    /// If `key` is absent.
    fn index(&self, key: i32) -> &V {
        match self.find(key) {
            Some(value) => value,
            None => panic!("HashIndex: key {key} not found"),
        }
    }
}

impl<V, const SIZE: usize> Extend<(i32, V)> for HashIndex<V, SIZE> {
    fn extend<I: IntoIterator<Item = (i32, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<V, const SIZE: usize> FromIterator<(i32, V)> for HashIndex<V, SIZE> {
    fn from_iter<I: IntoIterator<Item = (i32, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<'a, V, const SIZE: usize> IntoIterator for &'a HashIndex<V, SIZE> {
    type Item = (&'a i32, &'a V);
    type IntoIter = Iter<'a, i32, V, SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, const SIZE: usize> fmt::Debug for HashIndex<V, SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: Serialize, const SIZE: usize> Serialize for HashIndex<V, SIZE> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_keys_stay_independent() {
        let mut index: HashIndex<&str> = HashIndex::new();
        index.add(2, "a");
        index.add(255, "b");
        assert_eq!(index.len(), 2);
        assert_eq!(index.find(2), Some(&"a"));
        assert_eq!(index.find(255), Some(&"b"));

        assert!(index.exclude(2));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(255), Some(&"b"));
        assert!(!index.contains(2));
        assert!(!index.exclude(2));
    }

    #[test]
    fn negative_keys_wrap_to_unsigned_buckets() {
        let mut index: HashIndex<i32, 7> = HashIndex::new();
        index.add(-1, 10);
        index.add(-8, 20);
        assert_eq!(index[-1], 10);
        assert_eq!(index[-8], 20);
    }

    #[test]
    fn add_overwrites_include_keeps() {
        let mut index: HashIndex<u32> = HashIndex::new();
        *index.add(4, 1) += 10;
        assert_eq!(index[4], 11);
        index.add(4, 2);
        assert_eq!(index[4], 2);
        assert_eq!(*index.include(4, 3), 2);
        assert_eq!(*index.include(5, 3), 3);
        assert_eq!(index.len(), 2);
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn indexing_a_missing_key_panics() {
        let index: HashIndex<u8> = HashIndex::new();
        let _value: u8 = index[3];
    }

    #[test]
    fn take_leaves_an_empty_table() {
        let mut index: HashIndex<String, 11> = (0..5).map(|i| (i, i.to_string())).collect();
        let moved = index.take();
        assert!(index.is_empty());
        assert_eq!(moved.len(), 5);
        assert_eq!(moved.find(3).map(String::as_str), Some("3"));
    }

    #[test]
    fn free_drops_boxed_values() {
        let mut index: HashIndex<*mut Vec<u8>, 5> = HashIndex::new();
        for key in 0..4 {
            index.add(key, Box::into_raw(Box::new(vec![key as u8; 16])));
        }
        unsafe { index.free() };
        assert!(index.is_empty());
    }
}
