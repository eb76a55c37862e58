//! Containers.
//!
//! - Intrusive, non-owning linked containers: [`Chain`], [`List`],
//!   [`DChain`], [`DList`]. Elements embed their own [`Link`]s.
//! - Chaining hash tables backed by a [`Pool`](crate::alloc::Pool):
//!   [`HashIndex`], [`HashString`].

pub mod chain;
pub mod dchain;
pub mod dlist;
pub mod hash;
pub mod link;
pub mod list;

pub use chain::Chain;
pub use dchain::DChain;
pub use dlist::DList;
pub use hash::{hash_str, HashIndex, HashString};
pub use link::{Chainable, DChainable, Link};
pub use list::List;
