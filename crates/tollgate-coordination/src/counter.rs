//! Named signed atomic counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::metrics::{CounterMetrics, CounterStats};
use crate::registry::Closable;

/// A named signed 64-bit counter. All operations are single atomic
/// instructions; there are no blocking paths.
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicI64,
    stats: CounterMetrics,
}

impl Counter {
    /// Create a counter starting at zero.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            value: AtomicI64::new(0),
            stats: CounterMetrics::new(),
        })
    }

    /// The counter's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add `amount` (which may be negative) and return the post-increment
    /// value. Wraps on overflow.
    pub fn count(&self, amount: i64) -> i64 {
        self.value
            .fetch_add(amount, Ordering::AcqRel)
            .wrapping_add(amount)
    }

    /// Store `value` unconditionally.
    pub fn reset(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// The current value.
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Copy out the stats block.
    pub fn snapshot(&self) -> CounterStats {
        self.stats.snapshot()
    }
}

impl Closable for Counter {
    fn close(&self) {}
}
