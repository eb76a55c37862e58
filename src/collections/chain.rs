//! `Chain`: a non-owning singly linked container.
//!
//! Only the head pointer is stored; every other link lives in the elements.
//! Elements are borrowed for `'a` and are neither moved nor dropped by the
//! chain. Removing an element leaves its own link stale; the element can be
//! re-inserted anywhere afterwards.
//!
//! Linking is `unsafe`: nothing ties an element's link slot to one chain, so
//! the caller guarantees that an element sits in at most one container per
//! slot and that anchors are members. Storage that the chain should own goes
//! through [`Chain::add_boxed`].
//!
//! ```rust,compile_fail
//! use oz_core::collections::{Chain, Link};
//! use oz_core::chainable;
//!
//! struct Node {
//!     next: [Link<Node>; 1],
//! }
//! chainable!(Node, next);
//!
//! let a = Node { next: Default::default() };
//! let mut chain: Chain<'_, Node> = Chain::new();
//! chain.add(&a); // linking a borrowed element needs `unsafe`
//! ```

use super::link::{Chainable, Link};
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

/// A singly linked chain over link slot `INDEX` of its elements.
pub struct Chain<'a, T, const INDEX: usize = 0> {
    first: Option<NonNull<T>>,
    _marker: PhantomData<&'a T>,
}

#[inline(always)]
pub(crate) unsafe fn deref<'a, T>(ptr: NonNull<T>) -> &'a T {
    &*ptr.as_ptr()
}

impl<'a, T: Chainable, const INDEX: usize> Chain<'a, T, INDEX> {
    pub const fn new() -> Self {
        Self {
            first: None,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    fn next_of(e: &T) -> &Link<T> {
        &e.next_links()[INDEX]
    }

    /// Iterates from the first element.
    pub fn iter(&self) -> Iter<'a, T, INDEX> {
        Iter {
            next: self.first,
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

    /// The last element. Walks the whole chain.
    pub fn last(&self) -> Option<&'a T> {
        self.iter().last()
    }

    /// The element in front of `e`, or `None` if `e` is first or not a member.
    pub fn before(&self, e: &T) -> Option<&'a T> {
        let mut prev = None;
        for x in self.iter() {
            if ptr::eq(x, e) {
                return prev;
            }
            prev = Some(x);
        }
        None
    }

    /// Whether `e` itself is a member.
    pub fn has(&self, e: &T) -> bool {
        self.iter().any(|x| ptr::eq(x, e))
    }

    /// Whether a member equal to `e` exists.
    pub fn contains(&self, e: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|x| x == e)
    }

    /// Inserts `e` at the front. Same as [`Chain::push_first`].
    ///
    /// # Safety
    /// As for [`Chain::push_first`].
    #[inline]
    pub unsafe fn add(&mut self, e: &'a T) {
        self.push_first(e);
    }

    /// Inserts `e` at the front.
    ///
    /// # Safety
    /// `e` must not currently be a member of any container that uses link
    /// slot `INDEX`. A detached element with stale links is fine.
    #[inline]
    pub unsafe fn push_first(&mut self, e: &'a T) {
        self.link_first(NonNull::from(e));
    }

    /// Moves `e` to the heap and inserts it at the front.
    ///
    /// The element is leaked into the chain; [`Chain::free`] drops it.
    pub fn add_boxed(&mut self, e: Box<T>) -> &'a T {
        // Safety: a fresh box is in no container. The pointer keeps the
        // provenance of the box so `free` can release it.
        unsafe {
            let e = NonNull::new_unchecked(Box::into_raw(e));
            self.link_first(e);
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

    #[inline]
    unsafe fn link_first(&mut self, e: NonNull<T>) {
        Self::next_of(deref(e)).set(self.first);
        self.first = Some(e);
    }

    #[inline]
    unsafe fn link_after(&mut self, e: NonNull<T>, p: &T) {
        Self::next_of(deref(e)).set(Self::next_of(p).get());
        Self::next_of(p).set(Some(e));
    }

    /// Unlinks `e`, given the member in front of it (`None` if `e` is first).
    ///
    /// # Safety
    /// `e` must be a member of this chain and `prev` its predecessor.
    pub unsafe fn remove(&mut self, e: &T, prev: Option<&T>) {
        let target = Some(NonNull::from(e));
        match prev {
            Some(p) => {
                crate::hard_assert!(
                    Self::next_of(p).get() == target,
                    "remove: `prev` is not the predecessor"
                );
                Self::next_of(p).set(Self::next_of(e).get());
            }
            None => {
                crate::hard_assert!(self.first == target, "remove: element is not first");
                self.first = Self::next_of(e).get();
            }
        }
    }

    /// Unlinks and returns the first element.
    pub fn pop_first(&mut self) -> Option<&'a T> {
        crate::hard_assert!(self.first.is_some(), "pop_first on an empty chain");
        let e = self.first()?;
        self.first = Self::next_of(e).get();
        Some(e)
    }

    /// Unlinks the first element.
    #[inline]
    pub fn remove_first(&mut self) {
        self.pop_first();
    }

    /// Empties the chain. Elements keep their stale links.
    #[inline]
    pub fn clear(&mut self) {
        self.first = None;
    }

    /// Empties the chain and drops every element.
    ///
    /// # Safety
    /// Every member must have been linked from a `Box`, by
    /// [`Chain::add_boxed`] or [`Chain::clone_deep`], and must not be used
    /// afterwards.
    pub unsafe fn free(&mut self) {
        while let Some(e) = self.first {
            self.first = Self::next_of(deref(e)).get();
            drop(Box::from_raw(e.as_ptr()));
        }
    }

    /// Copies every element into a fresh `Box` and links the copies in the
    /// same order.
    ///
    /// The copies are leaked; release them with [`Chain::free`].
    pub fn clone_deep(&self) -> Self
    where
        T: Clone,
    {
        let mut copy = Self::new();
        let mut tail: Option<NonNull<T>> = None;
        for e in self.iter() {
            // Safety: every copy is a fresh box, and `tail` is the last copy.
            unsafe {
                let c = NonNull::new_unchecked(Box::into_raw(Box::new(e.clone())));
                match tail {
                    Some(t) => copy.link_after(c, deref(t)),
                    None => copy.link_first(c),
                }
                tail = Some(c);
            }
        }
        copy
    }
}

impl<T: Chainable, const INDEX: usize> Default for Chain<'_, T, INDEX> {
    fn default() -> Self {
        Self::new()
    }
}

/// Element-wise equality, in order.
impl<T: Chainable + PartialEq, const INDEX: usize> PartialEq for Chain<'_, T, INDEX> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Chainable + fmt::Debug, const INDEX: usize> fmt::Debug for Chain<'_, T, INDEX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Chainable, const INDEX: usize> IntoIterator for &Chain<'a, T, INDEX> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, INDEX>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over a [`Chain`] or [`List`](super::List).
pub struct Iter<'a, T, const INDEX: usize> {
    next: Option<NonNull<T>>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Chainable, const INDEX: usize> Iterator for Iter<'a, T, INDEX> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        // Safety: members are borrowed for 'a.
        let e = unsafe { deref(self.next?) };
        self.next = e.next_links()[INDEX].get();
        Some(e)
    }
}

impl<T, const INDEX: usize> Clone for Iter<'_, T, INDEX> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Node {
        value: i32,
        next: [Link<Node>; 1],
    }
    crate::chainable!(Node, next);

    fn node(value: i32) -> Node {
        Node {
            value,
            next: Default::default(),
        }
    }

    fn values(chain: &Chain<'_, Node>) -> Vec<i32> {
        chain.iter().map(|n| n.value).collect()
    }

    #[test]
    fn add_prepends() {
        let (a, b, c) = (node(1), node(2), node(3));
        let mut chain: Chain<'_, Node> = Chain::new();
        unsafe {
            chain.add(&a);
            chain.add(&b);
            chain.add(&c);
        }
        assert_eq!(values(&chain), [3, 2, 1]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.last().map(|n| n.value), Some(1));
        assert!(ptr::eq(chain.before(&a).unwrap(), &b));
        assert!(chain.before(&c).is_none());
    }

    #[test]
    fn insert_and_remove_in_the_middle() {
        let (a, b, c) = (node(1), node(2), node(3));
        let mut chain: Chain<'_, Node> = Chain::new();
        unsafe {
            chain.add(&c);
            chain.add(&a);
            chain.insert_after(&b, &a);
        }
        assert_eq!(values(&chain), [1, 2, 3]);

        unsafe { chain.remove(&b, Some(&a)) };
        assert_eq!(values(&chain), [1, 3]);
        assert!(!chain.has(&b));

        unsafe { chain.remove(&a, None) };
        assert_eq!(values(&chain), [3]);
    }

    #[test]
    fn has_is_identity_contains_is_equality() {
        let (a, twin) = (node(5), node(5));
        let mut chain: Chain<'_, Node> = Chain::new();
        unsafe { chain.add(&a) };
        assert!(chain.has(&a));
        assert!(!chain.has(&twin));
        assert!(chain.contains(&twin));
    }

    #[test]
    fn pop_first_walks_the_chain() {
        let (a, b) = (node(1), node(2));
        let mut chain: Chain<'_, Node> = Chain::new();
        unsafe {
            chain.add(&a);
            chain.add(&b);
        }
        assert_eq!(chain.pop_first().map(|n| n.value), Some(2));
        chain.remove_first();
        assert!(chain.is_empty());
    }

    #[test]
    fn boxed_members_are_owned_by_free() {
        let mut chain: Chain<'_, Node> = Chain::new();
        let first = chain.add_boxed(Box::new(node(1)));
        assert_eq!(first.value, 1);
        chain.add_boxed(Box::new(node(2)));
        assert_eq!(values(&chain), [2, 1]);
        unsafe { chain.free() };
        assert!(chain.is_empty());
    }

    #[test]
    fn clone_deep_keeps_order_and_equality() {
        let (a, b, c) = (node(1), node(2), node(3));
        let mut chain: Chain<'_, Node> = Chain::new();
        unsafe {
            chain.add(&a);
            chain.add(&b);
            chain.add(&c);
        }

        let mut copy = chain.clone_deep();
        assert_eq!(values(&copy), [3, 2, 1]);
        assert_eq!(copy, chain);
        assert!(!copy.has(&a));

        unsafe { copy.free() };
        assert!(copy.is_empty());
    }
}
