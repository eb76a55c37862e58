//! `Pool`: a block allocator for a single element type.
//!
//! Memory is obtained in blocks of `BLOCK_SIZE` slots. Free slots form an
//! intrusive LIFO list threaded through the slots themselves, so the most
//! recently released slot is the next one handed out. Blocks are only ever
//! returned all at once, by [`Pool::free`], and only when no slot is live.
//!
//! The pool hands out uninitialised storage. Constructing and destroying the
//! element are separate steps ([`construct_in`], [`destroy_in`]), with
//! [`Pool::construct`] and [`Pool::destruct`] pairing them for convenience.
//!
//! There is no internal synchronisation. A pool can move between threads but
//! cannot be shared.

use super::constants::{DEFAULT_BLOCK_SIZE, FREED_BYTE};
use super::global::ALLOC;
use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{size_of, ManuallyDrop, MaybeUninit};
use core::ptr::{self, NonNull};
use std::alloc::{alloc, dealloc, handle_alloc_error};

/// A slot holds either an element or the link to the next free slot.
union Slot<T> {
    #[allow(dead_code)]
    content: ManuallyDrop<MaybeUninit<T>>,
    next_slot: *mut Slot<T>,
}

struct Block<T, const N: usize> {
    data: [Slot<T>; N],
    next: *mut Block<T, N>,
}

/// A slab of `BLOCK_SIZE`-slot blocks serving one element type.
pub struct Pool<T, const BLOCK_SIZE: usize = { DEFAULT_BLOCK_SIZE }> {
    first_block: *mut Block<T, BLOCK_SIZE>,
    free_slot: *mut Slot<T>,
    size: usize,
    count: usize,
    _marker: PhantomData<T>,
}

// Safety: the pool owns its blocks outright; moving it moves that ownership.
unsafe impl<T: Send, const N: usize> Send for Pool<T, N> {}

impl<T, const BLOCK_SIZE: usize> Pool<T, BLOCK_SIZE> {
    const VALID_BLOCK_SIZE: () = assert!(BLOCK_SIZE >= 2, "a pool block needs at least two slots");

    const BLOCK_LAYOUT: Layout = Layout::new::<Block<T, BLOCK_SIZE>>();

    /// Creates an empty pool. No memory is allocated until the first
    /// [`Pool::alloc`].
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_BLOCK_SIZE;
        Self {
            first_block: ptr::null_mut(),
            free_slot: ptr::null_mut(),
            size: 0,
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Returns uninitialised storage for one `T`.
    ///
    /// A fresh block is allocated when no free slot is left.
    #[inline]
    pub fn alloc(&mut self) -> NonNull<T> {
        crate::hard_assert!(!ALLOC.is_locked(), "pool allocation while Alloc is locked");

        if self.free_slot.is_null() {
            self.grow();
        }
        let slot = self.free_slot;
        // Safety: `slot` is a free slot, so its active field is `next_slot`.
        unsafe {
            self.free_slot = (*slot).next_slot;
        }
        self.count += 1;
        // Safety: slots live inside a block and are never null.
        unsafe { NonNull::new_unchecked(slot.cast::<T>()) }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        let layout = Self::BLOCK_LAYOUT;
        // Safety: a block always has a non-zero size because of its `next` link.
        unsafe {
            let block = alloc(layout).cast::<Block<T, BLOCK_SIZE>>();
            if block.is_null() {
                handle_alloc_error(layout);
            }

            let data = ptr::addr_of_mut!((*block).data).cast::<Slot<T>>();
            for i in 0..BLOCK_SIZE - 1 {
                ptr::addr_of_mut!((*data.add(i)).next_slot).write(data.add(i + 1));
            }
            ptr::addr_of_mut!((*data.add(BLOCK_SIZE - 1)).next_slot).write(self.free_slot);
            ptr::addr_of_mut!((*block).next).write(self.first_block);

            self.first_block = block;
            self.free_slot = data;
        }
        self.size += 1;
    }

    /// Returns a slot to the pool. The element must already be destroyed.
    ///
    /// # Safety
    /// `ptr` must come from [`Pool::alloc`] on this pool and must not be
    /// released twice.
    #[inline]
    pub unsafe fn dealloc(&mut self, ptr: NonNull<T>) {
        crate::hard_assert!(!ALLOC.is_locked(), "pool deallocation while Alloc is locked");
        crate::hard_assert!(self.count != 0, "pool deallocation with no live slots");

        let slot = ptr.as_ptr().cast::<Slot<T>>();
        if cfg!(debug_assertions) {
            slot.cast::<u8>().write_bytes(FREED_BYTE, size_of::<Slot<T>>());
        }
        ptr::addr_of_mut!((*slot).next_slot).write(self.free_slot);
        self.free_slot = slot;
        self.count -= 1;
    }

    /// Allocates a slot and moves `value` into it.
    #[inline]
    pub fn construct(&mut self, value: T) -> NonNull<T> {
        let slot = self.alloc();
        // Safety: the slot is fresh and suitably aligned.
        unsafe { construct_in(slot, value) }
    }

    /// Drops the element at `ptr` and returns its slot to the pool.
    ///
    /// # Safety
    /// `ptr` must come from [`Pool::construct`] (or [`Pool::alloc`] followed by
    /// [`construct_in`]) on this pool and hold a live element.
    #[inline]
    pub unsafe fn destruct(&mut self, ptr: NonNull<T>) {
        destroy_in(ptr);
        self.dealloc(ptr);
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of blocks currently held.
    #[inline]
    pub fn blocks(&self) -> usize {
        self.size
    }

    /// Total slots across all blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size * BLOCK_SIZE
    }

    /// Releases every block.
    ///
    /// If slots are still live this would invalidate them, so the pool
    /// instead logs a soft assertion and keeps (leaks) its blocks.
    pub fn free(&mut self) {
        crate::soft_assert!(
            self.count == 0,
            "freeing a pool with {} live slots, its blocks are leaked",
            self.count
        );
        if self.count != 0 || self.first_block.is_null() {
            return;
        }
        crate::hard_assert!(!ALLOC.is_locked(), "pool release while Alloc is locked");

        let mut block = self.first_block;
        while !block.is_null() {
            // Safety: every block in the chain came from `grow` with this layout.
            unsafe {
                let next = (*block).next;
                dealloc(block.cast::<u8>(), Self::BLOCK_LAYOUT);
                block = next;
            }
        }
        self.first_block = ptr::null_mut();
        self.free_slot = ptr::null_mut();
        self.size = 0;
    }
}

impl<T, const BLOCK_SIZE: usize> Default for Pool<T, BLOCK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const BLOCK_SIZE: usize> Drop for Pool<T, BLOCK_SIZE> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<T, const BLOCK_SIZE: usize> fmt::Debug for Pool<T, BLOCK_SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("len", &self.count)
            .field("blocks", &self.size)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Moves `value` into uninitialised storage and returns the same pointer.
///
/// # Safety
/// `slot` must be valid for writes, aligned, and hold no live value.
#[inline]
pub unsafe fn construct_in<T>(slot: NonNull<T>, value: T) -> NonNull<T> {
    slot.as_ptr().write(value);
    slot
}

/// Drops the value at `ptr` in place, leaving the storage uninitialised.
///
/// # Safety
/// `ptr` must hold a live value that is not used afterwards.
#[inline]
pub unsafe fn destroy_in<T>(ptr: NonNull<T>) {
    ptr::drop_in_place(ptr.as_ptr());
}
