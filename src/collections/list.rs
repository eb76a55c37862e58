//! `List`: a [`Chain`] that also keeps its element count.

use super::chain::{Chain, Iter};
use super::link::Chainable;
use core::fmt;

/// A singly linked list with O(1) [`List::len`].
pub struct List<'a, T, const INDEX: usize = 0> {
    chain: Chain<'a, T, INDEX>,
    count: usize,
}

impl<'a, T: Chainable, const INDEX: usize> List<'a, T, INDEX> {
    pub const fn new() -> Self {
        Self {
            chain: Chain::new(),
            count: 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'a, T, INDEX> {
        self.chain.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn first(&self) -> Option<&'a T> {
        self.chain.first()
    }

    pub fn last(&self) -> Option<&'a T> {
        self.chain.last()
    }

    pub fn before(&self, e: &T) -> Option<&'a T> {
        self.chain.before(e)
    }

    pub fn has(&self, e: &T) -> bool {
        self.chain.has(e)
    }

    pub fn contains(&self, e: &T) -> bool
    where
        T: PartialEq,
    {
        self.chain.contains(e)
    }

    /// # Safety
    /// As for [`Chain::push_first`].
    #[inline]
    pub unsafe fn add(&mut self, e: &'a T) {
        self.push_first(e);
    }

    /// # Safety
    /// As for [`Chain::push_first`].
    #[inline]
    pub unsafe fn push_first(&mut self, e: &'a T) {
        self.chain.push_first(e);
        self.count += 1;
    }

    /// See [`Chain::add_boxed`].
    pub fn add_boxed(&mut self, e: Box<T>) -> &'a T {
        self.count += 1;
        self.chain.add_boxed(e)
    }

    /// # Safety
    /// As for [`Chain::insert_after`].
    pub unsafe fn insert_after(&mut self, e: &'a T, p: &T) {
        self.chain.insert_after(e, p);
        self.count += 1;
    }

    /// # Safety
    /// As for [`Chain::remove`].
    pub unsafe fn remove(&mut self, e: &T, prev: Option<&T>) {
        crate::hard_assert!(self.count != 0, "remove from an empty list");
        self.chain.remove(e, prev);
        self.count -= 1;
    }

    pub fn pop_first(&mut self) -> Option<&'a T> {
        let e = self.chain.pop_first()?;
        self.count -= 1;
        Some(e)
    }

    #[inline]
    pub fn remove_first(&mut self) {
        self.pop_first();
    }

    pub fn clear(&mut self) {
        self.chain.clear();
        self.count = 0;
    }

    /// Empties the list and drops every element.
    ///
    /// # Safety
    /// As for [`Chain::free`].
    pub unsafe fn free(&mut self) {
        self.chain.free();
        self.count = 0;
    }

    /// See [`Chain::clone_deep`].
    pub fn clone_deep(&self) -> Self
    where
        T: Clone,
    {
        Self {
            chain: self.chain.clone_deep(),
            count: self.count,
        }
    }
}

impl<T: Chainable, const INDEX: usize> Default for List<'_, T, INDEX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Chainable + PartialEq, const INDEX: usize> PartialEq for List<'_, T, INDEX> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.chain == other.chain
    }
}

impl<T: Chainable + fmt::Debug, const INDEX: usize> fmt::Debug for List<'_, T, INDEX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.chain, f)
    }
}

impl<'a, T: Chainable, const INDEX: usize> IntoIterator for &List<'a, T, INDEX> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, INDEX>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
