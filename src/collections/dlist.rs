//! `DList`: a [`DChain`] that also keeps its element count.

use super::dchain::{DChain, Iter};
use super::link::DChainable;
use core::fmt;

/// A doubly linked list with O(1) [`DList::len`].
pub struct DList<'a, T, const INDEX: usize = 0> {
    chain: DChain<'a, T, INDEX>,
    count: usize,
}

impl<'a, T: DChainable, const INDEX: usize> DList<'a, T, INDEX> {
    pub const fn new() -> Self {
        Self {
            chain: DChain::new(),
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

    #[inline]
    pub fn last(&self) -> Option<&'a T> {
        self.chain.last()
    }

    /// # Safety
    /// As for [`DChain::before`].
    #[inline]
    pub unsafe fn before(&self, e: &T) -> Option<&'a T> {
        self.chain.before(e)
    }

    /// # Safety
    /// As for [`DChain::after`].
    #[inline]
    pub unsafe fn after(&self, e: &T) -> Option<&'a T> {
        self.chain.after(e)
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
    /// As for [`DChain::push_first`].
    #[inline]
    pub unsafe fn add(&mut self, e: &'a T) {
        self.push_first(e);
    }

    /// # Safety
    /// As for [`DChain::push_first`].
    pub unsafe fn push_first(&mut self, e: &'a T) {
        self.chain.push_first(e);
        self.count += 1;
    }

    /// # Safety
    /// As for [`DChain::push_last`].
    pub unsafe fn push_last(&mut self, e: &'a T) {
        self.chain.push_last(e);
        self.count += 1;
    }

    pub fn add_boxed(&mut self, e: Box<T>) -> &'a T {
        self.count += 1;
        self.chain.add_boxed(e)
    }

    pub fn push_last_boxed(&mut self, e: Box<T>) -> &'a T {
        self.count += 1;
        self.chain.push_last_boxed(e)
    }

    /// # Safety
    /// As for [`DChain::insert_after`].
    pub unsafe fn insert_after(&mut self, e: &'a T, p: &T) {
        self.chain.insert_after(e, p);
        self.count += 1;
    }

    /// # Safety
    /// As for [`DChain::insert_before`].
    pub unsafe fn insert_before(&mut self, e: &'a T, p: &T) {
        self.chain.insert_before(e, p);
        self.count += 1;
    }

    /// # Safety
    /// As for [`DChain::remove`].
    pub unsafe fn remove(&mut self, e: &T) {
        crate::hard_assert!(self.count != 0, "remove from an empty list");
        self.chain.remove(e);
        self.count -= 1;
    }

    pub fn pop_first(&mut self) -> Option<&'a T> {
        let e = self.chain.pop_first()?;
        self.count -= 1;
        Some(e)
    }

    pub fn pop_last(&mut self) -> Option<&'a T> {
        let e = self.chain.pop_last()?;
        self.count -= 1;
        Some(e)
    }

    #[inline]
    pub fn remove_first(&mut self) {
        self.pop_first();
    }

    #[inline]
    pub fn remove_last(&mut self) {
        self.pop_last();
    }

    pub fn clear(&mut self) {
        self.chain.clear();
        self.count = 0;
    }

    /// Empties the list and drops every element.
    ///
    /// # Safety
    /// As for [`DChain::free`].
    pub unsafe fn free(&mut self) {
        self.chain.free();
        self.count = 0;
    }

    /// See [`DChain::clone_deep`].
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

impl<T: DChainable, const INDEX: usize> Default for DList<'_, T, INDEX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DChainable + PartialEq, const INDEX: usize> PartialEq for DList<'_, T, INDEX> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.chain == other.chain
    }
}

impl<T: DChainable + fmt::Debug, const INDEX: usize> fmt::Debug for DList<'_, T, INDEX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.chain, f)
    }
}

impl<'a, T: DChainable, const INDEX: usize> IntoIterator for &DList<'a, T, INDEX> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, INDEX>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::Link;

    #[derive(Clone, PartialEq, Debug)]
    struct Job {
        id: u16,
        prev: [Link<Job>; 1],
        next: [Link<Job>; 1],
    }
    crate::dchainable!(Job, prev, next);

    fn job(id: u16) -> Job {
        Job {
            id,
            prev: Default::default(),
            next: Default::default(),
        }
    }

    #[test]
    fn count_follows_inserts_and_removals() {
        let jobs: Vec<Job> = (0..4).map(job).collect();
        let mut list: DList<'_, Job> = DList::new();
        unsafe {
            list.push_last(&jobs[1]);
            list.push_first(&jobs[0]);
            list.insert_after(&jobs[3], &jobs[1]);
            list.insert_before(&jobs[2], &jobs[3]);
        }
        assert_eq!(list.len(), 4);
        assert_eq!(list.iter().map(|j| j.id).collect::<Vec<_>>(), [0, 1, 2, 3]);

        unsafe { list.remove(&jobs[2]) };
        assert_eq!(list.pop_last().map(|j| j.id), Some(3));
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().rev().map(|j| j.id).collect::<Vec<_>>(), [1, 0]);

        list.clear();
        assert_eq!(list.len(), 0);
        assert!(list.first().is_none());
    }

    #[test]
    fn free_drops_boxed_members() {
        let mut list: DList<'_, Job> = DList::new();
        for id in 0..3 {
            list.push_last_boxed(Box::new(job(id)));
        }
        let mut copy = list.clone_deep();
        assert_eq!(copy, list);
        unsafe {
            copy.free();
            list.free();
        }
        assert!(list.is_empty());
        assert!(copy.is_empty());
    }
}
