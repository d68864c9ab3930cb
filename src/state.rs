//! Application state shared across all HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use tollgate_coordination::{Barrier, Counter, Event, Registry, Semaphore, TokenBucket, Watchdog};

/// Shared application state passed to all axum handlers: one registry per
/// primitive kind plus the wake-loop sleep cap handed to new primitives.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

#[derive(Debug)]
struct StateInner {
    buckets: Registry<TokenBucket>,
    semaphores: Registry<Semaphore>,
    events: Registry<Event>,
    watchdogs: Registry<Watchdog>,
    barriers: Registry<Barrier>,
    counters: Registry<Counter>,
    max_sleep: Duration,
}

impl AppState {
    /// Create empty registries. `max_sleep` bounds any single sleep inside
    /// the engine's wake loops.
    pub fn new(max_sleep: Duration) -> Self {
        AppState {
            inner: Arc::new(StateInner {
                buckets: Registry::new(),
                semaphores: Registry::new(),
                events: Registry::new(),
                watchdogs: Registry::new(),
                barriers: Registry::new(),
                counters: Registry::new(),
                max_sleep,
            }),
        }
    }

    pub fn buckets(&self) -> &Registry<TokenBucket> {
        &self.inner.buckets
    }

    pub fn semaphores(&self) -> &Registry<Semaphore> {
        &self.inner.semaphores
    }

    pub fn events(&self) -> &Registry<Event> {
        &self.inner.events
    }

    pub fn watchdogs(&self) -> &Registry<Watchdog> {
        &self.inner.watchdogs
    }

    pub fn barriers(&self) -> &Registry<Barrier> {
        &self.inner.barriers
    }

    pub fn counters(&self) -> &Registry<Counter> {
        &self.inner.counters
    }

    pub fn max_sleep(&self) -> Duration {
        self.inner.max_sleep
    }
}
