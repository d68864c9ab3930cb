//! Per-primitive metric blocks.
//!
//! Each primitive kind carries a fixed block of `AtomicU64` counters
//! updated with atomic adds on the hot path. Snapshots copy the counters
//! and compute derived values (averages) at read time; nothing derived is
//! ever written back into shared state. `created_at` is fixed at
//! construction.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn average_ms(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Token bucket counters.
#[derive(Debug)]
pub struct TokenBucketMetrics {
    pub(crate) acquired: AtomicU64,
    pub(crate) timed_out: AtomicU64,
    pub(crate) total_wait_time: AtomicU64,
    created_at: DateTime<Utc>,
}

impl TokenBucketMetrics {
    pub(crate) fn new() -> Self {
        Self {
            acquired: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            total_wait_time: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn snapshot(&self) -> TokenBucketStats {
        let acquired = self.acquired.load(Ordering::Relaxed);
        let total_wait_time = self.total_wait_time.load(Ordering::Relaxed);
        TokenBucketStats {
            acquired,
            timed_out: self.timed_out.load(Ordering::Relaxed),
            total_wait_time,
            average_wait_time: average_ms(total_wait_time, acquired),
            created_at: rfc3339(self.created_at),
        }
    }
}

/// Token bucket stats as served by `/tokenbucket/{name}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenBucketStats {
    pub acquired: u64,
    pub timed_out: u64,
    pub total_wait_time: u64,
    pub average_wait_time: f64,
    pub created_at: String,
}

/// Semaphore counters.
#[derive(Debug)]
pub struct SemaphoreMetrics {
    pub(crate) acquired: AtomicU64,
    pub(crate) reacquired: AtomicU64,
    pub(crate) released: AtomicU64,
    pub(crate) expired: AtomicU64,
    pub(crate) timed_out: AtomicU64,
    pub(crate) total_wait_time: AtomicU64,
    max_ever_held: AtomicU64,
    created_at: DateTime<Utc>,
}

impl SemaphoreMetrics {
    pub(crate) fn new() -> Self {
        Self {
            acquired: AtomicU64::new(0),
            reacquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            total_wait_time: AtomicU64::new(0),
            max_ever_held: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    /// Raise the high-water mark of concurrently held leases.
    pub(crate) fn record_held(&self, held: u64) {
        self.max_ever_held.fetch_max(held, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SemaphoreStats {
        let acquired = self.acquired.load(Ordering::Relaxed);
        let total_wait_time = self.total_wait_time.load(Ordering::Relaxed);
        SemaphoreStats {
            acquired,
            reacquired: self.reacquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            total_wait_time,
            average_wait_time: average_ms(total_wait_time, acquired),
            max_ever_held: self.max_ever_held.load(Ordering::Relaxed),
            created_at: rfc3339(self.created_at),
        }
    }
}

/// Semaphore stats as served by `/semaphore/{name}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct SemaphoreStats {
    pub acquired: u64,
    pub reacquired: u64,
    pub released: u64,
    pub expired: u64,
    pub timed_out: u64,
    pub total_wait_time: u64,
    pub average_wait_time: f64,
    pub max_ever_held: u64,
    pub created_at: String,
}

/// Event counters. `triggered` latches at one.
#[derive(Debug)]
pub struct EventMetrics {
    pub(crate) triggered: AtomicU64,
    pub(crate) timed_out: AtomicU64,
    created_at: DateTime<Utc>,
}

impl EventMetrics {
    pub(crate) fn new() -> Self {
        Self {
            triggered: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn snapshot(&self) -> EventStats {
        EventStats {
            triggered: self.triggered.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            created_at: rfc3339(self.created_at),
        }
    }
}

/// Event stats as served by `/event/{name}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct EventStats {
    pub triggered: u64,
    pub timed_out: u64,
    pub created_at: String,
}

/// Watchdog counters.
#[derive(Debug)]
pub struct WatchdogMetrics {
    pub(crate) kicks: AtomicU64,
    pub(crate) triggered: AtomicU64,
    pub(crate) timed_out: AtomicU64,
    last_kick: Mutex<Option<DateTime<Utc>>>,
    created_at: DateTime<Utc>,
}

impl WatchdogMetrics {
    pub(crate) fn new() -> Self {
        Self {
            kicks: AtomicU64::new(0),
            triggered: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            last_kick: Mutex::new(None),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn record_kick(&self) {
        self.kicks.fetch_add(1, Ordering::Relaxed);
        *self.last_kick.lock() = Some(Utc::now());
    }

    pub(crate) fn snapshot(&self) -> WatchdogStats {
        let last_kick = *self.last_kick.lock();
        WatchdogStats {
            kicks: self.kicks.load(Ordering::Relaxed),
            triggered: self.triggered.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            last_kick: last_kick.map(rfc3339),
            created_at: rfc3339(self.created_at),
        }
    }
}

/// Watchdog stats as served by `/watchdog/{name}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct WatchdogStats {
    pub kicks: u64,
    pub triggered: u64,
    pub timed_out: u64,
    pub last_kick: Option<String>,
    pub created_at: String,
}

/// Barrier counters. `waiting` and `generation` live in the barrier's own
/// state and are passed in at snapshot time.
#[derive(Debug)]
pub struct BarrierMetrics {
    pub(crate) trips: AtomicU64,
    pub(crate) timed_out: AtomicU64,
    created_at: DateTime<Utc>,
}

impl BarrierMetrics {
    pub(crate) fn new() -> Self {
        Self {
            trips: AtomicU64::new(0),
            timed_out: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn snapshot(&self, generation: u64, waiting: u64) -> BarrierStats {
        BarrierStats {
            trips: self.trips.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            generation,
            waiting,
            created_at: rfc3339(self.created_at),
        }
    }
}

/// Barrier stats as served by `/barrier/{name}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct BarrierStats {
    pub trips: u64,
    pub timed_out: u64,
    pub generation: u64,
    pub waiting: u64,
    pub created_at: String,
}

/// Counter stats. The counter has no blocking paths, so its stats carry
/// only the creation timestamp.
#[derive(Debug)]
pub struct CounterMetrics {
    created_at: DateTime<Utc>,
}

impl CounterMetrics {
    pub(crate) fn new() -> Self {
        Self {
            created_at: Utc::now(),
        }
    }

    pub(crate) fn snapshot(&self) -> CounterStats {
        CounterStats {
            created_at: rfc3339(self.created_at),
        }
    }
}

/// Counter stats as served by `/counter/{name}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CounterStats {
    pub created_at: String,
}
