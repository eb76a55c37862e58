//! `DChain`: a non-owning doubly linked container.
//!
//! Head and tail are stored in the container, forward and backward links in
//! the elements. Unlike [`Chain`](super::Chain), removal needs no
//! predecessor and both ends are reachable in O(1).

use super::chain::deref;
use super::link::{DChainable, Link};
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

/// A doubly linked chain over link slot `INDEX` of its elements.
pub struct DChain<'a, T, const INDEX: usize = 0> {
    first: Option<NonNull<T>>,
    last: Option<NonNull<T>>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: DChainable, const INDEX: usize> DChain<'a, T, INDEX> {
    pub const fn new() -> Self {
        Self {
            first: None,
            last: None,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    fn next_of(e: &T) -> &Link<T> {
        &e.next_links()[INDEX]
    }

    #[inline(always)]
    fn prev_of(e: &T) -> &Link<T> {
        &e.prev_links()[INDEX]
    }

    /// Iterates from the first element. The iterator is double ended.
    pub fn iter(&self) -> Iter<'a, T, INDEX> {
        Iter {
            front: self.first,
            back: self.last,
            _marker: PhantomData,
        }
    }

    /// Number of elements. Walks the whole chain.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    #[inline]
    pub fn first(&self) -> Option<&'a T> {
        // Safety: members are borrowed for 'a.
        self.first.map(|e| unsafe { deref(e) })
    }

    #[inline]
    pub fn last(&self) -> Option<&'a T> {
        // Safety: members are borrowed for 'a.
        self.last.map(|e| unsafe { deref(e) })
    }

    /// The member in front of `e`.
    ///
    /// # Safety
    /// `e` must be a member of this chain.
    #[inline]
    pub unsafe fn before(&self, e: &T) -> Option<&'a T> {
        Self::prev_of(e).get().map(|p| deref(p))
    }

    /// The member behind `e`.
    ///
    /// # Safety
    /// `e` must be a member of this chain.
    #[inline]
    pub unsafe fn after(&self, e: &T) -> Option<&'a T> {
        Self::next_of(e).get().map(|n| deref(n))
    }

    pub fn has(&self, e: &T) -> bool {
        self.iter().any(|x| ptr::eq(x, e))
    }

    pub fn contains(&self, e: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|x| x == e)
    }

    /// Inserts `e` at the front. Same as [`DChain::push_first`].
    ///
    /// # Safety
    /// As for [`DChain::push_first`].
    #[inline]
    pub unsafe fn add(&mut self, e: &'a T) {
        self.push_first(e);
    }

    /// # Safety
    /// `e` must not currently be a member of any container that uses link
    /// slot `INDEX`.
    #[inline]
    pub unsafe fn push_first(&mut self, e: &'a T) {
        self.link_first(NonNull::from(e));
    }

    /// # Safety
    /// As for [`DChain::push_first`].
    #[inline]
    pub unsafe fn push_last(&mut self, e: &'a T) {
        self.link_last(NonNull::from(e));
    }

    /// Moves `e` to the heap and inserts it at the front. [`DChain::free`]
    /// drops it.
    pub fn add_boxed(&mut self, e: Box<T>) -> &'a T {
        // Safety: a fresh box is in no container.
        unsafe {
            let e = NonNull::new_unchecked(Box::into_raw(e));
            self.link_first(e);
            deref(e)
        }
    }

    /// Moves `e` to the heap and inserts it at the back.
    pub fn push_last_boxed(&mut self, e: Box<T>) -> &'a T {
        // Safety: a fresh box is in no container.
        unsafe {
            let e = NonNull::new_unchecked(Box::into_raw(e));
            self.link_last(e);
            deref(e)
        }
    }

    /// Inserts `e` right after the member `p`.
    ///
    /// # Safety
    /// `p` must be a member of this chain, and `e` must not be a member of
    /// any container that uses link slot `INDEX`.
    pub unsafe fn insert_after(&mut self, e: &'a T, p: &T) {
        crate::hard_assert!(!ptr::eq(e, p), "cannot insert an element after itself");
        crate::hard_assert!(self.has(p), "insert_after: anchor is not a member");
        self.link_after(NonNull::from(e), p);
    }

    /// Inserts `e` right before the member `p`.
    ///
    /// # Safety
    /// As for [`DChain::insert_after`].
    pub unsafe fn insert_before(&mut self, e: &'a T, p: &T) {
        crate::hard_assert!(!ptr::eq(e, p), "cannot insert an element before itself");
        crate::hard_assert!(self.has(p), "insert_before: anchor is not a member");
        self.link_before(NonNull::from(e), p);
    }

    unsafe fn link_first(&mut self, e: NonNull<T>) {
        let node = Some(e);
        Self::prev_of(deref(e)).set(None);
        Self::next_of(deref(e)).set(self.first);
        match self.first {
            Some(first) => Self::prev_of(deref(first)).set(node),
            None => self.last = node,
        }
        self.first = node;
    }

    unsafe fn link_last(&mut self, e: NonNull<T>) {
        let node = Some(e);
        Self::next_of(deref(e)).set(None);
        Self::prev_of(deref(e)).set(self.last);
        match self.last {
            Some(last) => Self::next_of(deref(last)).set(node),
            None => self.first = node,
        }
        self.last = node;
    }

    // The pointer to `p` is taken from the neighbour that already stores it.
    unsafe fn link_after(&mut self, e: NonNull<T>, p: &T) {
        let node = Some(e);
        let next = Self::next_of(p).get();
        let anchor = match next {
            Some(n) => {
                let n = deref(n);
                let anchor = Self::prev_of(n).get();
                Self::prev_of(n).set(node);
                anchor
            }
            None => self.last.replace(e),
        };
        Self::prev_of(deref(e)).set(anchor);
        Self::next_of(deref(e)).set(next);
        Self::next_of(p).set(node);
    }

    unsafe fn link_before(&mut self, e: NonNull<T>, p: &T) {
        let node = Some(e);
        let prev = Self::prev_of(p).get();
        let anchor = match prev {
            Some(q) => {
                let q = deref(q);
                let anchor = Self::next_of(q).get();
                Self::next_of(q).set(node);
                anchor
            }
            None => self.first.replace(e),
        };
        Self::next_of(deref(e)).set(anchor);
        Self::prev_of(deref(e)).set(prev);
        Self::prev_of(p).set(node);
    }

    /// Unlinks the member `e`.
    ///
    /// # Safety
    /// `e` must be a member of this chain.
    pub unsafe fn remove(&mut self, e: &T) {
        let node = Some(NonNull::from(e));
        let prev = Self::prev_of(e).get();
        let next = Self::next_of(e).get();

        match prev {
            Some(p) => {
                let p = deref(p);
                crate::hard_assert!(Self::next_of(p).get() == node, "remove: broken forward link");
                Self::next_of(p).set(next);
            }
            None => {
                crate::hard_assert!(self.first == node, "remove: element is not a member");
                self.first = next;
            }
        }
        match next {
            Some(n) => {
                let n = deref(n);
                crate::hard_assert!(Self::prev_of(n).get() == node, "remove: broken backward link");
                Self::prev_of(n).set(prev);
            }
            None => {
                crate::hard_assert!(self.last == node, "remove: element is not a member");
                self.last = prev;
            }
        }
    }

    /// Unlinks and returns the first element.
    pub fn pop_first(&mut self) -> Option<&'a T> {
        crate::hard_assert!(self.first.is_some(), "pop_first on an empty chain");
        let e = self.first()?;
        self.first = Self::next_of(e).get();
        match self.first {
            // Safety: members are borrowed for 'a.
            Some(n) => Self::prev_of(unsafe { deref(n) }).set(None),
            None => self.last = None,
        }
        Some(e)
    }

    /// Unlinks and returns the last element.
    pub fn pop_last(&mut self) -> Option<&'a T> {
        crate::hard_assert!(self.last.is_some(), "pop_last on an empty chain");
        let e = self.last()?;
        self.last = Self::prev_of(e).get();
        match self.last {
            // Safety: members are borrowed for 'a.
            Some(p) => Self::next_of(unsafe { deref(p) }).set(None),
            None => self.first = None,
        }
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

    /// Empties the chain. Elements keep their stale links.
    pub fn clear(&mut self) {
        self.first = None;
        self.last = None;
    }

    /// Empties the chain and drops every element.
    ///
    /// # Safety
    /// Every member must have been linked from a `Box` by
    /// [`DChain::add_boxed`], [`DChain::push_last_boxed`] or
    /// [`DChain::clone_deep`], and must not be used afterwards.
    pub unsafe fn free(&mut self) {
        let mut cursor = self.first;
        self.clear();
        while let Some(e) = cursor {
            cursor = Self::next_of(deref(e)).get();
            drop(Box::from_raw(e.as_ptr()));
        }
    }

    /// Copies every element into a fresh `Box` and links the copies in the
    /// same order. Release them with [`DChain::free`].
    pub fn clone_deep(&self) -> Self
    where
        T: Clone,
    {
        let mut copy = Self::new();
        for e in self.iter() {
            copy.push_last_boxed(Box::new(e.clone()));
        }
        copy
    }
}

impl<T: DChainable, const INDEX: usize> Default for DChain<'_, T, INDEX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DChainable + PartialEq, const INDEX: usize> PartialEq for DChain<'_, T, INDEX> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: DChainable + fmt::Debug, const INDEX: usize> fmt::Debug for DChain<'_, T, INDEX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: DChainable, const INDEX: usize> IntoIterator for &DChain<'a, T, INDEX> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, INDEX>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over a [`DChain`] or [`DList`](super::DList).
pub struct Iter<'a, T, const INDEX: usize> {
    front: Option<NonNull<T>>,
    back: Option<NonNull<T>>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: DChainable, const INDEX: usize> Iterator for Iter<'a, T, INDEX> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            // Safety: members are borrowed for 'a.
            self.front = unsafe { deref(node) }.next_links()[INDEX].get();
        }
        // Safety: as above.
        Some(unsafe { deref(node) })
    }
}

impl<'a, T: DChainable, const INDEX: usize> DoubleEndedIterator for Iter<'a, T, INDEX> {
    fn next_back(&mut self) -> Option<&'a T> {
        let node = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            // Safety: members are borrowed for 'a.
            self.back = unsafe { deref(node) }.prev_links()[INDEX].get();
        }
        // Safety: as above.
        Some(unsafe { deref(node) })
    }
}
