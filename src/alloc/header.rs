//! Block header layout.
//!
//! ```text
//!  chunk                                   user pointer
//!  |                                       |
//!  v                                       v
//!  [ ... padding ... | tag word | size word ][ payload ... ]
//!  <------------ header offset ------------>
//! ```
//!
//! The size word holds the total size of the chunk, header included. The tag
//! word is only written when leak tracking is compiled in.

use super::constants::{ALIGNMENT, HEADER_SIZE};
use core::mem::size_of;
use core::ptr::NonNull;

const WORD: usize = size_of::<usize>();

/// Header offset for a block aligned to `align`.
///
/// The default alignment uses [`HEADER_SIZE`]; stricter alignments push the
/// payload out by a full alignment unit, which always leaves room for two
/// words.
#[inline(always)]
pub(crate) const fn offset_for(align: usize) -> usize {
    if align <= ALIGNMENT {
        HEADER_SIZE
    } else {
        align
    }
}

/// Writes the size word in front of `user`.
///
/// # Safety
/// `user` must be preceded by at least one writable, word-aligned word.
#[inline(always)]
pub(crate) unsafe fn stamp_size(user: NonNull<u8>, size: usize) {
    user.as_ptr().sub(WORD).cast::<usize>().write(size);
}

/// Reads the size word in front of `user`.
///
/// # Safety
/// `user` must have been stamped with [`stamp_size`].
#[inline(always)]
pub(crate) unsafe fn read_size(user: NonNull<u8>) -> usize {
    user.as_ptr().sub(WORD).cast::<usize>().read()
}

#[cfg(feature = "trace-leaks")]
pub(crate) use tag::{read_tag, stamp_tag, Tag};

#[cfg(feature = "trace-leaks")]
mod tag {
    use super::WORD;
    use core::ptr::NonNull;

    /// Whether a block was recorded in a trace list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Tag {
        Traced,
        Untraced,
    }

    const TRACED: usize = 0x7472_6163;
    const UNTRACED: usize = 0x6e6f_6e65;

    /// # Safety
    /// `user` must be preceded by at least two writable, word-aligned words.
    #[inline(always)]
    pub(crate) unsafe fn stamp_tag(user: NonNull<u8>, tag: Tag) {
        let word = match tag {
            Tag::Traced => TRACED,
            Tag::Untraced => UNTRACED,
        };
        user.as_ptr().sub(2 * WORD).cast::<usize>().write(word);
    }

    /// Returns `None` when the tag word holds neither marker, which means the
    /// pointer was never produced by the allocator.
    ///
    /// # Safety
    /// `user` must be preceded by at least two readable, word-aligned words.
    #[inline(always)]
    pub(crate) unsafe fn read_tag(user: NonNull<u8>) -> Option<Tag> {
        match user.as_ptr().sub(2 * WORD).cast::<usize>().read() {
            TRACED => Some(Tag::Traced),
            UNTRACED => Some(Tag::Untraced),
            _ => None,
        }
    }
}
