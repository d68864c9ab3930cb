//! Lazily refilled token buckets.
//!
//! Refill is driven by arithmetic on the next-refill instant during
//! acquire rather than by a background task: an idle bucket costs nothing,
//! and there is no per-primitive task to join at deletion. Each period
//! dispenses up to `size` tokens with no cross-period carry-over.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::deadline::Deadline;
use crate::error::Error;
use crate::latch::Latch;
use crate::metrics::{TokenBucketMetrics, TokenBucketStats};
use crate::registry::Closable;

#[derive(Debug)]
struct BucketState {
    /// Tokens remaining in the current period.
    available: u64,
    /// When the next period starts.
    next_refill: Instant,
}

/// A named token bucket dispensing `size` tokens per `interval`.
#[derive(Debug)]
pub struct TokenBucket {
    name: String,
    size: AtomicU64,
    interval_ms: AtomicU64,
    state: Mutex<BucketState>,
    closed: Latch,
    max_sleep: Duration,
    stats: TokenBucketMetrics,
}

impl TokenBucket {
    /// Create a bucket with a full first period.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        interval: Duration,
        max_sleep: Duration,
    ) -> Arc<Self> {
        debug_assert!(size >= 1, "bucket size must be positive, got {}", size);
        debug_assert!(
            interval > Duration::ZERO,
            "refill interval must be positive"
        );

        Arc::new(Self {
            name: name.into(),
            size: AtomicU64::new(size),
            interval_ms: AtomicU64::new(interval.as_millis() as u64),
            state: Mutex::new(BucketState {
                available: size,
                next_refill: Instant::now() + interval,
            }),
            closed: Latch::new(),
            max_sleep,
            stats: TokenBucketMetrics::new(),
        })
    }

    /// The bucket's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply a later create request's parameters in place. New values take
    /// effect at the next refill boundary; the in-flight period is not
    /// disturbed.
    pub fn reconfigure(&self, size: u64, interval: Duration) {
        let interval_ms = interval.as_millis() as u64;
        let old_size = self.size.swap(size, Ordering::AcqRel);
        let old_interval = self.interval_ms.swap(interval_ms, Ordering::AcqRel);
        if old_size != size || old_interval != interval_ms {
            warn!(
                name = %self.name,
                size,
                interval_ms,
                "token bucket reconfigured in place; new values apply from the next refill"
            );
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Acquire))
    }

    /// Take one token, waiting out refill periods as needed. `arrival` is
    /// the request arrival instant and anchors the wait-time metric.
    pub async fn acquire(&self, deadline: Deadline, arrival: Instant) -> Result<(), Error> {
        loop {
            let next_refill = {
                let mut state = self.state.lock();
                let now = Instant::now();
                if now >= state.next_refill {
                    // one promotion per period, serialized by the state lock
                    state.available = self.size.load(Ordering::Acquire);
                    state.next_refill = now + self.interval();
                }
                if state.available > 0 {
                    state.available -= 1;
                    drop(state);
                    let waited = now.duration_since(arrival);
                    self.stats.acquired.fetch_add(1, Ordering::Relaxed);
                    self.stats
                        .total_wait_time
                        .fetch_add(waited.as_millis() as u64, Ordering::Relaxed);
                    debug!(name = %self.name, wait_ms = waited.as_millis() as u64, "token acquired");
                    return Ok(());
                }
                state.next_refill
            };

            let now = Instant::now();
            if deadline.expired(now) {
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                return Err(Error::TimedOut);
            }

            // sleep out the period, the caller deadline, or the loop cap,
            // whichever comes first
            let target = deadline.sleep_target(next_refill.min(now + self.max_sleep));
            tokio::select! {
                _ = self.closed.wait() => return Ok(()),
                _ = time::sleep_until(target) => {}
            }
        }
    }

    /// Copy out the stats block.
    pub fn snapshot(&self) -> TokenBucketStats {
        self.stats.snapshot()
    }
}

impl Closable for TokenBucket {
    fn close(&self) {
        self.closed.set();
    }
}
