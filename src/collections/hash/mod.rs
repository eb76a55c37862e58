//! Fixed-bucket chaining hash tables.
//!
//! - [`HashIndex`]: `i32` keys.
//! - [`HashString`]: string keys.
//!
//! Both never rehash. A soft assertion is logged once the load factor reaches
//! [`MAX_LOAD_FACTOR`](crate::alloc::constants::MAX_LOAD_FACTOR).

pub mod hash_index;
pub mod hash_string;
mod table;

pub use hash_index::HashIndex;
pub use hash_string::{hash_str, HashString};
pub use table::{Iter, IterMut};
