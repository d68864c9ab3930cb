//! Counting semaphores with leased keys.
//!
//! A successful acquire hands out an opaque lease key; the key must be
//! presented to release. Leases may expire on their own, so slot
//! availability changes asynchronously and acquire polls with a short
//! backoff instead of queueing behind a slot channel. Re-acquiring a
//! still-held key is idempotent and consumes no extra slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::deadline::Deadline;
use crate::error::Error;
use crate::keys::generate_key;
use crate::latch::Latch;
use crate::metrics::{SemaphoreMetrics, SemaphoreStats};
use crate::registry::Closable;

const POLL_INTERVAL: Duration =
    Duration::from_millis(tollgate_constants::coordination::ACQUIRE_POLL_INTERVAL_MS);

#[derive(Debug)]
struct Lease {
    /// Distinguishes this issuance of the key from any later one, so a
    /// stale expiry callback can never delete a re-issued key.
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug, Default)]
struct SemaphoreInner {
    leases: HashMap<String, Lease>,
    next_epoch: u64,
}

/// A named counting semaphore with at most `size` outstanding leases.
#[derive(Debug)]
pub struct Semaphore {
    name: String,
    size: AtomicU64,
    inner: Mutex<SemaphoreInner>,
    closed: Latch,
    stats: SemaphoreMetrics,
    weak_self: Weak<Semaphore>,
}

impl Semaphore {
    /// Create a semaphore with `size` slots.
    pub fn new(name: impl Into<String>, size: u64) -> Arc<Self> {
        debug_assert!(size >= 1, "semaphore size must be positive, got {}", size);

        Arc::new_cyclic(|weak_self| Self {
            name: name.into(),
            size: AtomicU64::new(size),
            inner: Mutex::new(SemaphoreInner::default()),
            closed: Latch::new(),
            stats: SemaphoreMetrics::new(),
            weak_self: weak_self.clone(),
        })
    }

    /// The semaphore's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply a later create request's slot count in place. Shrinking does
    /// not revoke outstanding leases; the new bound applies to inserts.
    pub fn reconfigure(&self, size: u64) {
        if self.size.swap(size, Ordering::AcqRel) != size {
            warn!(name = %self.name, size, "semaphore resized in place");
        }
    }

    /// Acquire a slot, returning the lease key. An empty or absent `key`
    /// gets a generated one; a still-held key is re-acquired without
    /// consuming a slot. `expires > 0` schedules lease expiry.
    pub async fn acquire(
        &self,
        deadline: Deadline,
        expires: Duration,
        key: Option<String>,
    ) -> Result<String, Error> {
        let key = match key {
            Some(key) if !key.is_empty() => key,
            _ => generate_key(),
        };

        if self.inner.lock().leases.contains_key(&key) {
            self.stats.reacquired.fetch_add(1, Ordering::Relaxed);
            debug!(name = %self.name, key = %key, "semaphore lease reacquired");
            return Ok(key);
        }

        let arrival = Instant::now();
        loop {
            if self.try_insert(&key, expires) {
                let waited = arrival.elapsed();
                self.stats.acquired.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .total_wait_time
                    .fetch_add(waited.as_millis() as u64, Ordering::Relaxed);
                debug!(name = %self.name, key = %key, "semaphore lease acquired");
                return Ok(key);
            }

            let now = Instant::now();
            if deadline.expired(now) {
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                debug!(name = %self.name, "semaphore acquire timed out");
                return Err(Error::TimedOut);
            }

            // all slots held; expiry or release will free one
            let target = deadline.sleep_target(now + POLL_INTERVAL);
            tokio::select! {
                _ = self.closed.wait() => return Ok(key),
                _ = time::sleep_until(target) => {}
            }
        }
    }

    /// Release the lease held under `key`. Fails with
    /// [`Error::UnknownKey`] if the key is not currently held.
    pub fn release(&self, key: &str) -> Result<(), Error> {
        let removed = self.inner.lock().leases.remove(key);
        match removed {
            Some(lease) => {
                if let Some(timer) = lease.timer {
                    timer.abort();
                }
                self.stats.released.fetch_add(1, Ordering::Relaxed);
                debug!(name = %self.name, key = %key, "semaphore lease released");
                Ok(())
            }
            None => Err(Error::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    /// Copy out the stats block.
    pub fn snapshot(&self) -> SemaphoreStats {
        self.stats.snapshot()
    }

    /// Number of currently outstanding leases.
    pub fn held(&self) -> u64 {
        self.inner.lock().leases.len() as u64
    }

    fn try_insert(&self, key: &str, expires: Duration) -> bool {
        let mut inner = self.inner.lock();
        if inner.leases.len() as u64 >= self.size.load(Ordering::Acquire) {
            return false;
        }

        let epoch = inner.next_epoch;
        inner.next_epoch += 1;

        let timer = (expires > Duration::ZERO).then(|| {
            let semaphore = self.weak_self.clone();
            let key = key.to_string();
            tokio::spawn(async move {
                time::sleep(expires).await;
                if let Some(semaphore) = semaphore.upgrade() {
                    semaphore.expire(&key, epoch);
                }
            })
        });

        inner.leases.insert(key.to_string(), Lease { epoch, timer });
        self.stats.record_held(inner.leases.len() as u64);
        true
    }

    /// Expiry callback. The epoch check makes the release/expiry race
    /// safe: a key released and re-issued since this timer was armed
    /// belongs to a different epoch and is left alone.
    fn expire(&self, key: &str, epoch: u64) {
        let mut inner = self.inner.lock();
        if inner.leases.get(key).is_some_and(|lease| lease.epoch == epoch) {
            inner.leases.remove(key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
            debug!(name = %self.name, key = %key, "semaphore lease expired");
        }
    }
}

impl Closable for Semaphore {
    fn close(&self) {
        self.closed.set();
        let mut inner = self.inner.lock();
        for (_, lease) in inner.leases.drain() {
            if let Some(timer) = lease.timer {
                timer.abort();
            }
        }
    }
}
