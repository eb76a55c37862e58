/// Alignment of every block returned by the allocator. Must be a power of two.
pub const ALIGNMENT: usize = 16;

/// Distance between the start of a block and the pointer handed to the caller.
///
/// The size header lives in the last word of this region.
pub const HEADER_SIZE: usize = align_up(core::mem::size_of::<usize>(), ALIGNMENT);

/// Byte pattern written over freed memory in debug builds.
pub const FREED_BYTE: u8 = 0xee;

/// Default number of slots per pool block.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Number of stack frames kept per traced allocation.
pub const MAX_TRACE_FRAMES: usize = 32;

/// Load factor at which a hash table starts complaining. It never rehashes.
pub const MAX_LOAD_FACTOR: f32 = 0.75;

/// Default bucket count of `HashIndex`. Prime, to spread sequential keys.
pub const DEFAULT_INDEX_SIZE: usize = 253;

/// Default bucket count of `HashString`.
pub const DEFAULT_STRING_SIZE: usize = 256;

/// Rounds `size` up to the next multiple of `align`, which must be a power of two.
#[inline(always)]
pub const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

const _: () = {
    assert!(ALIGNMENT.is_power_of_two());
    // The trace tag shares the header region with the size word.
    assert!(HEADER_SIZE >= 2 * core::mem::size_of::<usize>());
    assert!(HEADER_SIZE % ALIGNMENT == 0);
};
