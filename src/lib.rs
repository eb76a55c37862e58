//! # `oz_core` - Memory and Container Substrate
//!
//! The bottom layer of an engine: a size-tracking global allocator, a typed
//! block pool, intrusive linked containers and fixed-bucket hash tables.
//! Everything above it allocates through these pieces.
//!
//! ## Components
//!
//! 1. **Allocator** ([`Alloc`], [`ALLOC`], [`OzAlloc`]):
//!    - 16-byte aligned blocks with a size header in front of each one
//!    - Process-wide statistics (live, cumulative and peak counts and bytes)
//!    - Optional leak tracking with captured call stacks (`trace-leaks`)
//!    - Installable as the Rust `#[global_allocator]`
//!
//! 2. **Pool** ([`Pool<T, BLOCK_SIZE>`](Pool)):
//!    - Fixed-size blocks of slots for one element type
//!    - LIFO free list threaded through released slots
//!    - Blocks are only returned when the pool is empty
//!
//! 3. **Intrusive containers** ([`Chain`], [`List`], [`DChain`], [`DList`]):
//!    - Links live inside the elements; containers store head and tail only
//!    - One element can sit in several containers through different link slots
//!    - Containers never own or drop their elements
//!
//! 4. **Hash tables** ([`HashIndex`], [`HashString`]):
//!    - Fixed bucket count, chaining, no rehashing
//!    - Nodes come from a private [`Pool`]
//!
//! ## Assertions
//!
//! Misuse is caught by [`hard_assert!`] (abort) and [`soft_assert!`] (log and
//! continue) in debug builds only. Release builds trust the caller.
//!
//! ## Example
//!
//! ```rust
//! use oz_core::collections::{HashString, Link, List};
//! use oz_core::chainable;
//!
//! struct Entity {
//!     name: &'static str,
//!     next: [Link<Entity>; 1],
//! }
//! chainable!(Entity, next);
//!
//! let player = Entity { name: "player", next: Default::default() };
//! let door = Entity { name: "door", next: Default::default() };
//!
//! let mut active: List<'_, Entity> = List::new();
//! // Safety: neither entity is in another list.
//! unsafe {
//!     active.add(&door);
//!     active.add(&player);
//! }
//! assert_eq!(active.len(), 2);
//!
//! let mut by_name: HashString<usize> = HashString::new();
//! for (i, e) in active.iter().enumerate() {
//!     by_name.add(e.name, i);
//! }
//! assert_eq!(by_name["door"], 1);
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_safety_doc)]

#[macro_use]
pub mod assert;
pub mod alloc;
pub mod collections;

#[doc(hidden)]
pub use tracing as __tracing;

pub use alloc::{construct_in, destroy_in, Alloc, AllocFault, AllocMode, OzAlloc, Pool, Statistics, ALLOC};
pub use collections::{
    hash_str, Chain, Chainable, DChain, DChainable, DList, HashIndex, HashString, Link, List,
};

// Compile-time layout checks.
const _: () = {
    use core::mem;

    // A link is a single nullable pointer.
    assert!(mem::size_of::<Link<u64>>() == mem::size_of::<usize>());

    // Containers are a head (and tail) pointer; lists add one counter.
    assert!(mem::size_of::<Chain<'static, u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<DChain<'static, u64>>() == 2 * mem::size_of::<usize>());
    assert!(mem::size_of::<List<'static, u64>>() == 2 * mem::size_of::<usize>());

    // The allocator handle is free to install.
    assert!(mem::size_of::<OzAlloc>() == 0);
};
