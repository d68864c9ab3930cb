//! Generational N-party barriers.
//!
//! Parties block until `size` of them have arrived; the last arrival trips
//! the cohort's latch and releases exactly `size` parties. The barrier is
//! immediately reusable: later arrivals join the next generation.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::deadline::{Deadline, wait_latch};
use crate::error::Error;
use crate::latch::Latch;
use crate::metrics::{BarrierMetrics, BarrierStats};
use crate::registry::Closable;

#[derive(Debug)]
struct BarrierInner {
    /// Parties currently blocked in this generation.
    waiting: u64,
    /// Cohort number, bumped on every trip.
    generation: u64,
    /// The current generation's wake source.
    latch: Latch,
}

/// A named rendezvous point for `size` parties.
#[derive(Debug)]
pub struct Barrier {
    name: String,
    size: u64,
    inner: Mutex<BarrierInner>,
    stats: BarrierMetrics,
}

impl Barrier {
    /// Create a barrier for `size` parties.
    pub fn new(name: impl Into<String>, size: u64) -> Arc<Self> {
        debug_assert!(size >= 1, "barrier size must be positive, got {}", size);

        Arc::new(Self {
            name: name.into(),
            size,
            inner: Mutex::new(BarrierInner {
                waiting: 0,
                generation: 0,
                latch: Latch::new(),
            }),
            stats: BarrierMetrics::new(),
        })
    }

    /// The barrier's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The party count fixed at creation.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// A later create request named a different size: the cohort size is
    /// fixed, so warn and keep the original.
    pub fn check_size(&self, size: u64) {
        if size != self.size {
            warn!(
                name = %self.name,
                requested = size,
                actual = self.size,
                "barrier size differs from the original; keeping the original"
            );
        }
    }

    /// Block until `size` parties (this one included) have arrived.
    pub async fn wait(&self, deadline: Deadline) -> Result<(), Error> {
        let (generation, latch) = {
            let mut inner = self.inner.lock();
            inner.waiting += 1;
            if inner.waiting == self.size {
                // last arrival: release this cohort and start the next
                inner.waiting = 0;
                inner.generation += 1;
                let tripped = std::mem::replace(&mut inner.latch, Latch::new());
                let generation = inner.generation;
                drop(inner);

                tripped.set();
                self.stats.trips.fetch_add(1, Ordering::Relaxed);
                debug!(name = %self.name, generation, "barrier tripped");
                return Ok(());
            }
            (inner.generation, inner.latch.clone())
        };

        match wait_latch(&latch, deadline).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let mut inner = self.inner.lock();
                if inner.generation == generation {
                    // still our cohort: take ourselves out of the count
                    inner.waiting -= 1;
                    self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                    Err(err)
                } else {
                    // the cohort tripped while the timer was firing
                    Ok(())
                }
            }
        }
    }

    /// Copy out the stats block.
    pub fn snapshot(&self) -> BarrierStats {
        let inner = self.inner.lock();
        self.stats.snapshot(inner.generation, inner.waiting)
    }
}

impl Closable for Barrier {
    fn close(&self) {
        self.inner.lock().latch.set();
    }
}
