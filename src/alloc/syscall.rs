//! Platform aligned allocation.
//!
//! Unix goes straight to `posix_memalign`/`free`. Other targets use the
//! standard `System` allocator with an explicit layout, which maps to the
//! platform's aligned allocation routine.

use core::ptr::NonNull;

/// Obtains `size` bytes aligned to `align` from the platform.
///
/// Returns `None` when the platform allocator fails.
///
/// # Safety
/// `align` must be a power of two and a multiple of `size_of::<usize>()`.
/// `size` must be non-zero.
#[cfg(unix)]
pub unsafe fn allocate_aligned(size: usize, align: usize) -> Option<NonNull<u8>> {
    let mut ptr: *mut libc::c_void = core::ptr::null_mut();
    if libc::posix_memalign(&mut ptr, align, size) != 0 {
        return None;
    }
    NonNull::new(ptr.cast::<u8>())
}

/// Returns a block obtained from [`allocate_aligned`] to the platform.
///
/// # Safety
/// `ptr` must come from `allocate_aligned(size, align)` and not be freed yet.
#[cfg(unix)]
pub unsafe fn free_aligned(ptr: NonNull<u8>, _size: usize, _align: usize) {
    libc::free(ptr.as_ptr().cast::<libc::c_void>());
}

#[cfg(not(unix))]
pub unsafe fn allocate_aligned(size: usize, align: usize) -> Option<NonNull<u8>> {
    use std::alloc::{GlobalAlloc, Layout, System};

    let layout = Layout::from_size_align(size, align).ok()?;
    NonNull::new(System.alloc(layout))
}

#[cfg(not(unix))]
pub unsafe fn free_aligned(ptr: NonNull<u8>, size: usize, align: usize) {
    use std::alloc::{GlobalAlloc, Layout, System};

    System.dealloc(ptr.as_ptr(), Layout::from_size_align_unchecked(size, align));
}
