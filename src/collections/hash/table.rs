//! Fixed-bucket chaining table shared by [`HashIndex`](super::HashIndex) and
//! [`HashString`](super::HashString).
//!
//! The bucket array never grows. Each bucket is a singly linked chain of
//! nodes allocated from a private [`Pool`] whose block size equals the
//! bucket count. New nodes are prepended to their bucket.

use crate::alloc::constants::MAX_LOAD_FACTOR;
use crate::alloc::Pool;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

pub(crate) struct Elem<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    next: *mut Elem<K, V>,
}

pub(crate) struct ChainTable<K, V, const SIZE: usize> {
    data: [*mut Elem<K, V>; SIZE],
    pool: Pool<Elem<K, V>, SIZE>,
    count: usize,
}

// Safety: the table owns every node; nothing is shared with other tables.
unsafe impl<K: Send, V: Send, const SIZE: usize> Send for ChainTable<K, V, SIZE> {}

impl<K, V, const SIZE: usize> ChainTable<K, V, SIZE> {
    pub(crate) const fn new() -> Self {
        Self {
            data: [ptr::null_mut(); SIZE],
            pool: Pool::new(),
            count: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn load_factor(&self) -> f32 {
        self.count as f32 / SIZE as f32
    }

    /// The first node of `bucket` whose key satisfies `matches`.
    #[inline]
    pub(crate) fn find(
        &self,
        bucket: usize,
        mut matches: impl FnMut(&K) -> bool,
    ) -> Option<NonNull<Elem<K, V>>> {
        let mut p = self.data[bucket];
        // Safety: chain nodes are live pool slots owned by the table.
        unsafe {
            while let Some(elem) = p.as_ref() {
                if matches(&elem.key) {
                    return Some(NonNull::new_unchecked(p));
                }
                p = elem.next;
            }
        }
        None
    }

    #[inline]
    pub(crate) fn value(&self, elem: NonNull<Elem<K, V>>) -> &V {
        // Safety: `elem` came from `find` on this table.
        unsafe { &(*elem.as_ptr()).value }
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, elem: NonNull<Elem<K, V>>) -> &mut V {
        // Safety: `elem` came from `find` on this table, which is borrowed mutably.
        unsafe { &mut (*elem.as_ptr()).value }
    }

    /// Prepends a new node to `bucket`. The key must not be present.
    pub(crate) fn prepend(&mut self, bucket: usize, key: K, value: V) -> &mut V {
        let elem = self.pool.construct(Elem {
            key,
            value,
            next: self.data[bucket],
        });
        self.data[bucket] = elem.as_ptr();
        self.count += 1;

        crate::soft_assert!(
            self.load_factor() < MAX_LOAD_FACTOR,
            "hash table load factor {:.2} reached the limit of {:.2}",
            self.load_factor(),
            MAX_LOAD_FACTOR
        );
        // Safety: freshly constructed node owned by the table.
        unsafe { &mut (*elem.as_ptr()).value }
    }

    /// Unlinks the first node of `bucket` matching the key and returns its
    /// contents.
    pub(crate) fn unlink(
        &mut self,
        bucket: usize,
        mut matches: impl FnMut(&K) -> bool,
    ) -> Option<(K, V)> {
        let mut link: *mut *mut Elem<K, V> = &mut self.data[bucket];
        // Safety: chain nodes are live pool slots owned by the table.
        unsafe {
            while let Some(elem) = NonNull::new(*link) {
                if matches(&(*elem.as_ptr()).key) {
                    *link = (*elem.as_ptr()).next;
                    self.count -= 1;
                    let Elem { key, value, .. } = elem.as_ptr().read();
                    self.pool.dealloc(elem);
                    return Some((key, value));
                }
                link = &mut (*elem.as_ptr()).next;
            }
        }
        None
    }

    /// Removes every node, handing its contents to `sink`.
    pub(crate) fn drain_with(&mut self, mut sink: impl FnMut(K, V)) {
        for bucket in 0..SIZE {
            let mut p = core::mem::replace(&mut self.data[bucket], ptr::null_mut());
            // Safety: chain nodes are live pool slots owned by the table.
            unsafe {
                while let Some(elem) = NonNull::new(p) {
                    p = (*elem.as_ptr()).next;
                    let Elem { key, value, .. } = elem.as_ptr().read();
                    self.pool.dealloc(elem);
                    sink(key, value);
                }
            }
        }
        self.count = 0;
    }

    pub(crate) fn clear(&mut self) {
        self.drain_with(|_, _| {});
    }

    /// Returns the pool's blocks. The table must be empty.
    pub(crate) fn dealloc(&mut self) {
        crate::hard_assert!(self.count == 0, "dealloc on a table with {} entries", self.count);
        self.pool.free();
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V, SIZE> {
        Iter {
            data: &self.data,
            bucket: 0,
            elem: ptr::null_mut(),
            remaining: self.count,
            _marker: PhantomData,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V, SIZE> {
        IterMut {
            data: &self.data,
            bucket: 0,
            elem: ptr::null_mut(),
            remaining: self.count,
            _marker: PhantomData,
        }
    }

    /// Copies the table bucket by bucket. Copies are prepended, so every
    /// chain comes out reversed.
    pub(crate) fn clone_reversed(&self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let mut copy = Self::new();
        for bucket in 0..SIZE {
            let mut p = self.data[bucket];
            // Safety: chain nodes are live pool slots owned by the table.
            unsafe {
                while let Some(elem) = p.as_ref() {
                    let node = copy.pool.construct(Elem {
                        key: elem.key.clone(),
                        value: elem.value.clone(),
                        next: copy.data[bucket],
                    });
                    copy.data[bucket] = node.as_ptr();
                    p = elem.next;
                }
            }
        }
        copy.count = self.count;
        copy
    }

    /// Equal counts and, bucket by bucket, equal chains in the same order.
    pub(crate) fn chains_equal(&self, other: &Self) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        if self.count != other.count {
            return false;
        }
        (0..SIZE).all(|bucket| {
            let (mut a, mut b) = (self.data[bucket], other.data[bucket]);
            // Safety: chain nodes are live pool slots owned by their tables.
            unsafe {
                while let (Some(x), Some(y)) = (a.as_ref(), b.as_ref()) {
                    if x.key != y.key || x.value != y.value {
                        return false;
                    }
                    a = x.next;
                    b = y.next;
                }
            }
            a.is_null() && b.is_null()
        })
    }
}

impl<K, V, const SIZE: usize> Drop for ChainTable<K, V, SIZE> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Iterator over the entries of a table, bucket by bucket.
pub struct Iter<'a, K, V, const SIZE: usize> {
    data: &'a [*mut Elem<K, V>; SIZE],
    bucket: usize,
    elem: *mut Elem<K, V>,
    remaining: usize,
    _marker: PhantomData<(&'a K, &'a V)>,
}

#[inline]
fn advance<K, V, const SIZE: usize>(
    data: &[*mut Elem<K, V>; SIZE],
    bucket: &mut usize,
    elem: &mut *mut Elem<K, V>,
) -> Option<NonNull<Elem<K, V>>> {
    // Safety: callers hold a borrow of the table for the iterator's lifetime.
    unsafe {
        if let Some(current) = elem.as_ref() {
            *elem = current.next;
        }
        while elem.is_null() {
            if *bucket == SIZE {
                return None;
            }
            *elem = data[*bucket];
            *bucket += 1;
        }
        Some(NonNull::new_unchecked(*elem))
    }
}

impl<'a, K, V, const SIZE: usize> Iterator for Iter<'a, K, V, SIZE> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let elem = advance(self.data, &mut self.bucket, &mut self.elem)?;
        self.remaining -= 1;
        // Safety: the table is borrowed for 'a.
        let elem = unsafe { &*elem.as_ptr() };
        Some((&elem.key, &elem.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, const SIZE: usize> ExactSizeIterator for Iter<'_, K, V, SIZE> {}

/// Iterator over the entries of a table with mutable values.
pub struct IterMut<'a, K, V, const SIZE: usize> {
    data: &'a [*mut Elem<K, V>; SIZE],
    bucket: usize,
    elem: *mut Elem<K, V>,
    remaining: usize,
    _marker: PhantomData<(&'a K, &'a mut V)>,
}

impl<'a, K, V, const SIZE: usize> Iterator for IterMut<'a, K, V, SIZE> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let elem = advance(self.data, &mut self.bucket, &mut self.elem)?;
        self.remaining -= 1;
        // Safety: the table is borrowed mutably for 'a and each node is
        // yielded once.
        let elem = unsafe { &mut *elem.as_ptr() };
        Some((&elem.key, &mut elem.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, const SIZE: usize> ExactSizeIterator for IterMut<'_, K, V, SIZE> {}
