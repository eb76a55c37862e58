//! Allocation statistics.
//!
//! Counters are updated with a relaxed load followed by a relaxed store rather
//! than an atomic read-modify-write. Under concurrent allocation from several
//! threads some updates get lost, so the numbers are approximate, the same as
//! plain integers bumped without a lock. A context confined to one thread
//! keeps exact counts.

use core::sync::atomic::{AtomicUsize, Ordering};
use serde::Serialize;

/// A point-in-time copy of the allocator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Live blocks.
    pub count: usize,
    /// Live bytes, headers included.
    pub amount: usize,
    /// Blocks ever allocated.
    pub sum_count: usize,
    /// Bytes ever allocated.
    pub sum_amount: usize,
    /// Peak of `count`.
    pub max_count: usize,
    /// Peak of `amount`.
    pub max_amount: usize,
}

impl Statistics {
    /// Live bytes in MiB, for human-readable reports.
    pub fn amount_mib(&self) -> f64 {
        to_mib(self.amount)
    }
}

#[inline]
fn to_mib(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

pub(crate) struct AllocStats {
    count: AtomicUsize,
    amount: AtomicUsize,
    sum_count: AtomicUsize,
    sum_amount: AtomicUsize,
    max_count: AtomicUsize,
    max_amount: AtomicUsize,
}

#[inline(always)]
fn bump(counter: &AtomicUsize, delta: usize) -> usize {
    let value = counter.load(Ordering::Relaxed).wrapping_add(delta);
    counter.store(value, Ordering::Relaxed);
    value
}

#[inline(always)]
fn drop_by(counter: &AtomicUsize, delta: usize) {
    let value = counter.load(Ordering::Relaxed).wrapping_sub(delta);
    counter.store(value, Ordering::Relaxed);
}

#[inline(always)]
fn raise(peak: &AtomicUsize, value: usize) {
    if value > peak.load(Ordering::Relaxed) {
        peak.store(value, Ordering::Relaxed);
    }
}

impl AllocStats {
    pub(crate) const fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            amount: AtomicUsize::new(0),
            sum_count: AtomicUsize::new(0),
            sum_amount: AtomicUsize::new(0),
            max_count: AtomicUsize::new(0),
            max_amount: AtomicUsize::new(0),
        }
    }

    #[inline(always)]
    pub(crate) fn on_alloc(&self, size: usize) {
        let count = bump(&self.count, 1);
        let amount = bump(&self.amount, size);
        bump(&self.sum_count, 1);
        bump(&self.sum_amount, size);
        raise(&self.max_count, count);
        raise(&self.max_amount, amount);
    }

    #[inline(always)]
    pub(crate) fn on_dealloc(&self, size: usize) {
        drop_by(&self.count, 1);
        drop_by(&self.amount, size);
    }

    pub(crate) fn snapshot(&self) -> Statistics {
        Statistics {
            count: self.count.load(Ordering::Relaxed),
            amount: self.amount.load(Ordering::Relaxed),
            sum_count: self.sum_count.load(Ordering::Relaxed),
            sum_amount: self.sum_amount.load(Ordering::Relaxed),
            max_count: self.max_count.load(Ordering::Relaxed),
            max_amount: self.max_amount.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!(target: "oz_core::alloc", "Alloc statistics {{");
        tracing::info!(target: "oz_core::alloc", "  current chunks     {}", s.count);
        tracing::info!(
            target: "oz_core::alloc",
            "  current amount     {:.2} MiB ({} B)",
            s.amount_mib(),
            s.amount
        );
        tracing::info!(target: "oz_core::alloc", "  maximum chunks     {}", s.max_count);
        tracing::info!(
            target: "oz_core::alloc",
            "  maximum amount     {:.2} MiB ({} B)",
            to_mib(s.max_amount),
            s.max_amount
        );
        tracing::info!(target: "oz_core::alloc", "  cumulative chunks  {}", s.sum_count);
        tracing::info!(
            target: "oz_core::alloc",
            "  cumulative amount  {:.2} MiB ({} B)",
            to_mib(s.sum_amount),
            s.sum_amount
        );
        tracing::info!(target: "oz_core::alloc", "}}");
    }
}
