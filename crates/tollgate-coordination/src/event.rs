//! One-shot broadcast events with a payload.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use tracing::debug;

use crate::deadline::{Deadline, wait_latch};
use crate::error::Error;
use crate::latch::Latch;
use crate::metrics::{EventMetrics, EventStats};
use crate::registry::Closable;

#[derive(Debug)]
struct EventInner {
    message: String,
    closed: bool,
}

/// A named one-shot broadcast. The first send freezes the payload and
/// trips the latch; every waiter, past and future, observes that same
/// payload. A second send is a conflict. `closed` is terminal.
#[derive(Debug)]
pub struct Event {
    name: String,
    inner: Mutex<EventInner>,
    latch: Latch,
    stats: EventMetrics,
}

impl Event {
    /// Create an unsent event with an empty payload.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inner: Mutex::new(EventInner {
                message: String::new(),
                closed: false,
            }),
            latch: Latch::new(),
            stats: EventMetrics::new(),
        })
    }

    /// The event's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the event, returning the payload once it has been sent.
    pub async fn wait(&self, deadline: Deadline) -> Result<String, Error> {
        match wait_latch(&self.latch, deadline).await {
            Ok(()) => Ok(self.inner.lock().message.clone()),
            Err(err) => {
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Send the event, waking all waiters with `message`. Fails with
    /// [`Error::EventClosed`] if the event was already sent.
    pub fn send(&self, message: String) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(Error::EventClosed);
        }
        inner.message = message;
        inner.closed = true;
        drop(inner);

        self.latch.set();
        self.stats.triggered.fetch_add(1, Ordering::Relaxed);
        debug!(name = %self.name, "event sent");
        Ok(())
    }

    /// Copy out the stats block.
    pub fn snapshot(&self) -> EventStats {
        self.stats.snapshot()
    }
}

impl Closable for Event {
    // Waiters on a deleted event complete normally; an unsent event
    // releases them with the empty payload.
    fn close(&self) {
        self.latch.set();
    }
}
