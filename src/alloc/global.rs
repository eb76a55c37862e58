//! `Alloc`: the aligned, size-tracking allocator.
//!
//! Every block carries its total size in a header word right before the user
//! pointer, so deallocation needs nothing but the pointer. The context keeps
//! process-wide statistics and, with the `trace-leaks` feature, a record of
//! every live block together with the stack that allocated it.
//!
//! Install it as the Rust global allocator through [`OzAlloc`]:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static GLOBAL: oz_core::alloc::OzAlloc = oz_core::alloc::OzAlloc;
//! ```

use super::constants::{ALIGNMENT, FREED_BYTE};
use super::header;
use super::stats::{AllocStats, Statistics};
use crate::assert::fatal;
use core::alloc::{GlobalAlloc, Layout};
use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

#[cfg(feature = "trace-leaks")]
use super::header::Tag;
#[cfg(feature = "trace-leaks")]
use super::spin::SpinLock;
#[cfg(feature = "trace-leaks")]
use super::trace::{self, ReentrancyGuard, TraceEntry, TraceFault, TraceLists};

/// Which family of entry points a block went through.
///
/// A block must be released through the same mode it was allocated with.
/// Leak tracking checks this and aborts on a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocMode {
    /// A single object.
    Object,
    /// An array of objects.
    Array,
}

impl AllocMode {
    pub(crate) fn other(self) -> Self {
        match self {
            AllocMode::Object => AllocMode::Array,
            AllocMode::Array => AllocMode::Object,
        }
    }
}

impl fmt::Display for AllocMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AllocMode::Object => "object",
            AllocMode::Array => "array",
        })
    }
}

/// Conditions the allocator cannot recover from.
///
/// These values are only used to format the diagnostic printed before the
/// process aborts; no operation returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocFault {
    /// The platform refused a request of `size` bytes.
    OutOfMemory { size: usize },
    /// A block was released through the wrong mode.
    ModeMismatch { address: usize, freed_as: AllocMode },
    /// A pointer that the allocator never produced was released.
    Unallocated { address: usize },
    /// An allocation or deallocation happened while the allocator was locked.
    Locked,
}

impl fmt::Display for AllocFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AllocFault::OutOfMemory { size } => {
                write!(f, "out of memory while allocating {size} B")
            }
            AllocFault::ModeMismatch { address, freed_as } => {
                let allocated_as = freed_as.other();
                write!(
                    f,
                    "{allocated_as} block at {address:#x} released as {freed_as} (new/delete mismatch)"
                )
            }
            AllocFault::Unallocated { address } => {
                write!(f, "freeing unallocated block at {address:#x}")
            }
            AllocFault::Locked => f.write_str("allocator used while locked"),
        }
    }
}

impl std::error::Error for AllocFault {}

/// An allocator context: statistics, lock flag and leak records.
///
/// [`ALLOC`] is the process-wide instance. Separate contexts can be created
/// with [`Alloc::new`]; they share nothing with [`ALLOC`].
pub struct Alloc {
    stats: AllocStats,
    locked: AtomicBool,
    init: Once,
    #[cfg(feature = "trace-leaks")]
    traces: SpinLock<TraceLists>,
}

/// The process-wide allocator context.
pub static ALLOC: Alloc = Alloc::new();

/// Zero-sized handle that routes `GlobalAlloc` to [`ALLOC`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OzAlloc;

impl Alloc {
    /// Creates a context with zeroed counters.
    pub const fn new() -> Self {
        Self {
            stats: AllocStats::new(),
            locked: AtomicBool::new(false),
            init: Once::new(),
            #[cfg(feature = "trace-leaks")]
            traces: SpinLock::new(TraceLists::new()),
        }
    }

    /// One-time setup. Call it before spawning threads.
    ///
    /// With leak tracking this primes the stack unwinder. Without it the call
    /// does nothing. If it is never called explicitly, the first traced
    /// allocation performs it.
    pub fn init(&self) {
        self.init.call_once(|| {
            #[cfg(feature = "trace-leaks")]
            {
                // Unwinder setup allocates; keep those blocks out of the lists.
                let _guard = ReentrancyGuard::enter();
                trace::warm_up();
            }
        });
    }

    /// Allocates `size` bytes aligned to [`ALIGNMENT`].
    ///
    /// Never returns null: if the platform is out of memory the process
    /// aborts with a diagnostic.
    ///
    /// # Safety
    /// The block must be released with [`Alloc::deallocate`] on this same
    /// context, with the same `mode`.
    pub unsafe fn allocate(&self, mode: AllocMode, size: usize) -> NonNull<u8> {
        crate::hard_assert!(size != 0, "zero-sized allocation");
        self.allocate_aligned(mode, size, ALIGNMENT)
    }

    /// Releases a block obtained from [`Alloc::allocate`].
    ///
    /// # Safety
    /// `ptr` must come from `allocate` on this context with the same `mode`
    /// and must not be used afterwards.
    pub unsafe fn deallocate(&self, mode: AllocMode, ptr: NonNull<u8>) {
        self.deallocate_aligned(mode, ptr, ALIGNMENT);
    }

    #[cfg_attr(not(feature = "trace-leaks"), allow(unused_variables))]
    unsafe fn allocate_aligned(&self, mode: AllocMode, size: usize, align: usize) -> NonNull<u8> {
        crate::hard_assert!(!self.is_locked(), "{}", AllocFault::Locked);

        let offset = header::offset_for(align);
        // `offset` is a multiple of ALIGNMENT, so this is align_up(size) + offset.
        let total = size
            .checked_add(offset + ALIGNMENT - 1)
            .map(|padded| padded & !(ALIGNMENT - 1))
            .unwrap_or_else(|| fatal(AllocFault::OutOfMemory { size }));

        let chunk = match super::syscall::allocate_aligned(total, align.max(ALIGNMENT)) {
            Some(chunk) => chunk,
            None => fatal(AllocFault::OutOfMemory { size: total }),
        };
        let user = NonNull::new_unchecked(chunk.as_ptr().add(offset));
        header::stamp_size(user, total);
        self.stats.on_alloc(total);

        #[cfg(feature = "trace-leaks")]
        self.track(mode, chunk, user, total);

        user
    }

    #[cfg_attr(not(feature = "trace-leaks"), allow(unused_variables))]
    unsafe fn deallocate_aligned(&self, mode: AllocMode, user: NonNull<u8>, align: usize) {
        crate::hard_assert!(!self.is_locked(), "{}", AllocFault::Locked);

        let offset = header::offset_for(align);
        let total = header::read_size(user);
        let chunk = NonNull::new_unchecked(user.as_ptr().sub(offset));
        self.stats.on_dealloc(total);

        #[cfg(feature = "trace-leaks")]
        self.untrack(mode, chunk, user, total);

        if cfg!(debug_assertions) {
            chunk.as_ptr().write_bytes(FREED_BYTE, total);
        }
        super::syscall::free_aligned(chunk, total, align.max(ALIGNMENT));
    }

    #[cfg(feature = "trace-leaks")]
    unsafe fn track(&self, mode: AllocMode, chunk: NonNull<u8>, user: NonNull<u8>, total: usize) {
        let tag = match ReentrancyGuard::enter() {
            Some(_guard) => {
                self.init();
                let entry = match TraceEntry::capture(chunk.as_ptr() as usize, total) {
                    Some(entry) => entry,
                    None => fatal(AllocFault::OutOfMemory {
                        size: core::mem::size_of::<TraceEntry>(),
                    }),
                };
                self.traces.lock().push(mode, entry);
                Tag::Traced
            }
            None => Tag::Untraced,
        };
        header::stamp_tag(user, tag);
    }

    #[cfg(feature = "trace-leaks")]
    unsafe fn untrack(&self, mode: AllocMode, chunk: NonNull<u8>, user: NonNull<u8>, total: usize) {
        let address = user.as_ptr() as usize;
        match header::read_tag(user) {
            Some(Tag::Untraced) => {}
            Some(Tag::Traced) => {
                let unlinked = self.traces.lock().unlink(mode, chunk.as_ptr() as usize);
                match unlinked {
                    Ok(entry) => {
                        crate::hard_assert!(
                            entry.as_ref().size == total,
                            "block at {:#x}: header says {} B, trace says {} B",
                            address,
                            total,
                            entry.as_ref().size
                        );
                        TraceEntry::release(entry);
                    }
                    Err(TraceFault::Mismatch) => fatal(AllocFault::ModeMismatch {
                        address,
                        freed_as: mode,
                    }),
                    Err(TraceFault::Unallocated) => fatal(AllocFault::Unallocated { address }),
                }
            }
            None => fatal(AllocFault::Unallocated { address }),
        }
    }

    /// A snapshot of the counters.
    pub fn statistics(&self) -> Statistics {
        self.stats.snapshot()
    }

    /// Logs the counters at `info` level.
    pub fn print_summary(&self) {
        self.stats.log_summary();
    }

    /// Logs every live traced block with the stack that allocated it.
    ///
    /// Returns `true` if anything was reported. Always `false` when leak
    /// tracking is not compiled in.
    pub fn print_leaks(&self) -> bool {
        #[cfg(feature = "trace-leaks")]
        {
            // Blocks allocated while reporting stay untraced.
            let _guard = ReentrancyGuard::enter();

            // Copy out under the lock and log after releasing it: a subscriber
            // may free traced blocks, which needs the lock.
            let leaks: Vec<(AllocMode, usize, usize, Vec<usize>)> = {
                let lists = self.traces.lock();
                let mut leaks = Vec::new();
                lists.for_each(|mode, entry| {
                    leaks.push((mode, entry.address, entry.size, entry.frames().to_vec()));
                });
                leaks
            };

            for (mode, address, size, frames) in &leaks {
                tracing::warn!(
                    target: "oz_core::alloc",
                    "Leaked {} at {:#x} of size {} B",
                    mode,
                    address,
                    size
                );
                for &ip in frames {
                    match trace::describe_frame(ip) {
                        Some(frame) => tracing::warn!(target: "oz_core::alloc", "    {}", frame),
                        None => tracing::warn!(target: "oz_core::alloc", "    {:#x}", ip),
                    }
                }
            }
            !leaks.is_empty()
        }
        #[cfg(not(feature = "trace-leaks"))]
        {
            false
        }
    }

    /// Number of live traced blocks. Zero without leak tracking.
    pub fn leak_count(&self) -> usize {
        #[cfg(feature = "trace-leaks")]
        {
            self.traces.lock().len()
        }
        #[cfg(not(feature = "trace-leaks"))]
        {
            0
        }
    }

    /// Forbids allocation until [`Alloc::unlock`]. Any allocation or
    /// deallocation in between fails a hard assertion.
    pub fn lock(&self) {
        self.locked.store(true, Ordering::Release);
    }

    /// Lifts [`Alloc::lock`].
    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

impl Default for Alloc {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Alloc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alloc")
            .field("statistics", &self.statistics())
            .field("locked", &self.is_locked())
            .finish()
    }
}

unsafe impl GlobalAlloc for Alloc {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocate_aligned(AllocMode::Object, layout.size(), layout.align())
            .as_ptr()
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Some(ptr) = NonNull::new(ptr) {
            self.deallocate_aligned(AllocMode::Object, ptr, layout.align());
        }
    }
}

unsafe impl GlobalAlloc for OzAlloc {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOC.alloc(layout)
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        ALLOC.dealloc(ptr, layout)
    }
}
