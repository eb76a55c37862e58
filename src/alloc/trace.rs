//! Leak tracking (feature `trace-leaks`).
//!
//! Every traced allocation pushes a [`TraceEntry`] onto the list matching its
//! [`AllocMode`]. Entries live in platform memory, outside the allocator they
//! describe. Stack frames are captured as raw instruction pointers and only
//! resolved to symbols when a leak is reported.
//!
//! Capturing and resolving stacks may allocate. A thread-local flag marks the
//! thread as being inside the allocator; nested allocations are then served
//! untraced instead of recursing into the trace lists.

use super::constants::MAX_TRACE_FRAMES;
use super::global::AllocMode;
use super::syscall;
use core::cell::Cell;
use core::mem::{align_of, size_of};
use core::ptr::{self, NonNull};

thread_local! {
    static IN_ALLOCATOR: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running allocator bookkeeping.
pub(crate) struct ReentrancyGuard;

impl ReentrancyGuard {
    /// Returns `None` when the thread is already inside the allocator, or
    /// when thread-local storage is unavailable (thread teardown).
    pub(crate) fn enter() -> Option<Self> {
        match IN_ALLOCATOR.try_with(Cell::get) {
            Ok(false) => {
                let _ = IN_ALLOCATOR.try_with(|flag| flag.set(true));
                Some(Self)
            }
            _ => None,
        }
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        let _ = IN_ALLOCATOR.try_with(|flag| flag.set(false));
    }
}

/// One live traced allocation.
pub(crate) struct TraceEntry {
    next: *mut TraceEntry,
    pub(crate) address: usize,
    pub(crate) size: usize,
    n_frames: usize,
    frames: [usize; MAX_TRACE_FRAMES],
}

const ENTRY_ALIGN: usize = if align_of::<TraceEntry>() > 16 {
    align_of::<TraceEntry>()
} else {
    16
};

// Frames belonging to the allocator itself.
const SKIPPED_FRAMES: usize = 3;

impl TraceEntry {
    /// Allocates an entry for the chunk at `address` and records the current
    /// stack. Returns `None` if the platform is out of memory.
    pub(crate) fn capture(address: usize, size: usize) -> Option<NonNull<TraceEntry>> {
        // Safety: the layout is non-zero and the alignment a power of two.
        let entry = unsafe { syscall::allocate_aligned(size_of::<TraceEntry>(), ENTRY_ALIGN)? }
            .cast::<TraceEntry>();

        let mut frames = [0usize; MAX_TRACE_FRAMES];
        let mut n_frames = 0;
        let mut skip = SKIPPED_FRAMES;
        backtrace::trace(|frame| {
            if skip > 0 {
                skip -= 1;
                return true;
            }
            frames[n_frames] = frame.ip() as usize;
            n_frames += 1;
            n_frames < MAX_TRACE_FRAMES
        });

        // Safety: freshly allocated and suitably aligned.
        unsafe {
            entry.as_ptr().write(TraceEntry {
                next: ptr::null_mut(),
                address,
                size,
                n_frames,
                frames,
            });
        }
        Some(entry)
    }

    /// Returns the entry's memory to the platform.
    ///
    /// # Safety
    /// `entry` must come from [`TraceEntry::capture`] and be unlinked.
    pub(crate) unsafe fn release(entry: NonNull<TraceEntry>) {
        syscall::free_aligned(entry.cast(), size_of::<TraceEntry>(), ENTRY_ALIGN);
    }

    /// Captured instruction pointers, innermost first.
    pub(crate) fn frames(&self) -> &[usize] {
        &self.frames[..self.n_frames]
    }
}

/// Why a block could not be found in the list matching its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraceFault {
    /// Found in the other mode's list.
    Mismatch,
    /// Not found anywhere.
    Unallocated,
}

/// The two trace lists, one per allocation mode.
pub(crate) struct TraceLists {
    objects: *mut TraceEntry,
    arrays: *mut TraceEntry,
}

// Safety: the lists are only touched under the allocator's spin lock.
unsafe impl Send for TraceLists {}

impl TraceLists {
    pub(crate) const fn new() -> Self {
        Self {
            objects: ptr::null_mut(),
            arrays: ptr::null_mut(),
        }
    }

    fn head(&mut self, mode: AllocMode) -> &mut *mut TraceEntry {
        match mode {
            AllocMode::Object => &mut self.objects,
            AllocMode::Array => &mut self.arrays,
        }
    }

    /// # Safety
    /// `entry` must be a live entry that is in no list.
    pub(crate) unsafe fn push(&mut self, mode: AllocMode, entry: NonNull<TraceEntry>) {
        let head = self.head(mode);
        (*entry.as_ptr()).next = *head;
        *head = entry.as_ptr();
    }

    /// Unlinks the entry for `address` from the list matching `mode`.
    ///
    /// On failure the other list is searched to tell a mode mismatch apart
    /// from a pointer that was never allocated.
    pub(crate) fn unlink(
        &mut self,
        mode: AllocMode,
        address: usize,
    ) -> Result<NonNull<TraceEntry>, TraceFault> {
        let mut link: *mut *mut TraceEntry = self.head(mode);
        // Safety: every node in the list is a live entry.
        unsafe {
            while let Some(entry) = NonNull::new(*link) {
                if (*entry.as_ptr()).address == address {
                    *link = (*entry.as_ptr()).next;
                    return Ok(entry);
                }
                link = &mut (*entry.as_ptr()).next;
            }
        }

        let other = self.head(mode.other());
        if Self::find(*other, address) {
            Err(TraceFault::Mismatch)
        } else {
            Err(TraceFault::Unallocated)
        }
    }

    fn find(mut entry: *mut TraceEntry, address: usize) -> bool {
        // Safety: every node in the list is a live entry.
        unsafe {
            while let Some(e) = entry.as_ref() {
                if e.address == address {
                    return true;
                }
                entry = e.next;
            }
        }
        false
    }

    /// Visits every live entry, objects first.
    pub(crate) fn for_each(&self, mut visit: impl FnMut(AllocMode, &TraceEntry)) {
        for (mode, mut entry) in [(AllocMode::Object, self.objects), (AllocMode::Array, self.arrays)] {
            // Safety: every node in the list is a live entry.
            while let Some(e) = unsafe { entry.as_ref() } {
                visit(mode, e);
                entry = e.next;
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        let mut n = 0;
        self.for_each(|_, _| n += 1);
        n
    }
}

/// Resolves one instruction pointer to `symbol (file:line)`, or `None` when
/// no symbol information is available.
pub(crate) fn describe_frame(ip: usize) -> Option<String> {
    let mut description = None;
    backtrace::resolve(ip as *mut core::ffi::c_void, |symbol| {
        if description.is_some() {
            return;
        }
        let name = symbol
            .name()
            .map_or_else(|| String::from("<unknown>"), |n| n.to_string());
        description = Some(match (symbol.filename(), symbol.lineno()) {
            (Some(file), Some(line)) => format!("{name} ({}:{line})", file.display()),
            (Some(file), None) => format!("{name} ({})", file.display()),
            _ => name,
        });
    });
    description
}

/// Touches the unwinder once so its lazy setup happens before other threads
/// start allocating.
pub(crate) fn warm_up() {
    backtrace::trace(|_| false);
}
