//! Memory allocation: the global [`Alloc`] context and the typed [`Pool`].

pub mod constants;
pub mod global;
mod header;
pub mod pool;
pub mod spin;
mod stats;
pub mod syscall;
#[cfg(feature = "trace-leaks")]
mod trace;

pub use global::{Alloc, AllocFault, AllocMode, OzAlloc, ALLOC};
pub use pool::{construct_in, destroy_in, Pool};
pub use spin::{SpinLock, SpinLockGuard};
pub use stats::Statistics;
