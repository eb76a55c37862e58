//! Embedded links for the intrusive containers.
//!
//! An element takes part in linked containers by carrying arrays of
//! [`Link`]s, one slot per topology it can belong to. A container with const
//! parameter `INDEX` only ever touches slot `INDEX`, so one element can be in
//! several containers at once as long as each uses a different slot.
//!
//! ```rust
//! use oz_core::collections::{Chain, Link};
//! use oz_core::chainable;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Task {
//!     id: u32,
//!     next: [Link<Task>; 2],
//! }
//! chainable!(Task, next);
//!
//! let a = Task { id: 1, next: Default::default() };
//! let b = Task { id: 2, next: Default::default() };
//!
//! let mut by_arrival: Chain<'_, Task, 0> = Chain::new();
//! let mut by_priority: Chain<'_, Task, 1> = Chain::new();
//! // Safety: each task is in one chain per slot.
//! unsafe {
//!     by_arrival.add(&a);
//!     by_arrival.add(&b);
//!     by_priority.add(&b);
//!     by_priority.add(&a);
//! }
//!
//! assert_eq!(by_arrival.first().map(|t| t.id), Some(2));
//! assert_eq!(by_priority.first().map(|t| t.id), Some(1));
//! ```

use core::cell::Cell;
use core::fmt;
use core::ptr::NonNull;

/// One embedded link: a nullable pointer to another element.
///
/// Cloning produces an unlinked link and any two links compare equal, so an
/// element can derive `Clone` and `PartialEq` and have them act on its
/// payload alone.
pub struct Link<T> {
    target: Cell<Option<NonNull<T>>>,
}

impl<T> Link<T> {
    /// An unlinked link.
    pub const fn new() -> Self {
        Self {
            target: Cell::new(None),
        }
    }

    /// The linked element, if any. Stale after the element is detached.
    #[inline]
    pub fn get(&self) -> Option<NonNull<T>> {
        self.target.get()
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.target.get().is_some()
    }

    #[inline]
    pub(crate) fn set(&self, target: Option<NonNull<T>>) {
        self.target.set(target);
    }

    #[inline]
    pub(crate) fn point_to(&self, target: Option<&T>) {
        self.target.set(target.map(NonNull::from));
    }
}

impl<T> Default for Link<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<T> Eq for Link<T> {}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(target) => write!(f, "Link({:p})", target),
            None => f.write_str("Link(None)"),
        }
    }
}

/// Elements that can be members of [`Chain`](super::Chain) and
/// [`List`](super::List).
///
/// # Safety
/// `next_links` must return the same links on every call, and those links
/// must not be modified other than by the containers.
pub unsafe trait Chainable: Sized {
    /// The forward links, indexed by container topology.
    fn next_links(&self) -> &[Link<Self>];
}

/// Elements that can be members of [`DChain`](super::DChain) and
/// [`DList`](super::DList).
///
/// # Safety
/// As for [`Chainable`]. `prev_links` must have at least as many slots as
/// `next_links` for every index in use.
pub unsafe trait DChainable: Chainable {
    /// The backward links, indexed by container topology.
    fn prev_links(&self) -> &[Link<Self>];
}

/// Implements [`Chainable`] for a struct with a `[Link<Self>; K]` field.
///
/// ```rust,ignore
/// chainable!(Task, next);
/// ```
#[macro_export]
macro_rules! chainable {
    ($ty:ty, $next:ident) => {
        unsafe impl $crate::collections::Chainable for $ty {
            #[inline]
            fn next_links(&self) -> &[$crate::collections::Link<Self>] {
                &self.$next
            }
        }
    };
}

/// Implements [`Chainable`] and [`DChainable`] for a struct with `prev` and
/// `next` link arrays.
///
/// ```rust,ignore
/// dchainable!(Task, prev, next);
/// ```
#[macro_export]
macro_rules! dchainable {
    ($ty:ty, $prev:ident, $next:ident) => {
        $crate::chainable!($ty, $next);

        unsafe impl $crate::collections::DChainable for $ty {
            #[inline]
            fn prev_links(&self) -> &[$crate::collections::Link<Self>] {
                &self.$prev
            }
        }
    };
}
