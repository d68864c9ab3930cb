//! Watchdogs: reverse timers tripped by silence.
//!
//! A kick pushes the trip deadline out; waiters complete when the kicks
//! stop. Waiting polls the deadline rather than arming a timer per kick,
//! so a kick never races a firing timer.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::deadline::Deadline;
use crate::error::Error;
use crate::latch::Latch;
use crate::metrics::{WatchdogMetrics, WatchdogStats};
use crate::registry::Closable;

/// A named watchdog. Trips when `now` reaches the deadline.
#[derive(Debug)]
pub struct Watchdog {
    name: String,
    deadline: Mutex<Instant>,
    closed: Latch,
    max_sleep: Duration,
    stats: WatchdogMetrics,
}

impl Watchdog {
    /// Create a watchdog armed `expires` from now.
    pub fn new(name: impl Into<String>, expires: Duration, max_sleep: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            deadline: Mutex::new(Instant::now() + expires),
            closed: Latch::new(),
            max_sleep,
            stats: WatchdogMetrics::new(),
        })
    }

    /// The watchdog's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push the trip deadline out to `now + expires`.
    pub fn kick(&self, expires: Duration) {
        *self.deadline.lock() = Instant::now() + expires;
        self.stats.record_kick();
        debug!(name = %self.name, expires_ms = expires.as_millis() as u64, "watchdog kicked");
    }

    /// Wait until the watchdog trips. Returns immediately if it already
    /// has. Each wake re-reads the trip deadline, since a concurrent kick
    /// may have pushed it out.
    pub async fn wait(&self, deadline: Deadline) -> Result<(), Error> {
        loop {
            let trip_at = *self.deadline.lock();
            let now = Instant::now();
            if now >= trip_at {
                self.stats.triggered.fetch_add(1, Ordering::Relaxed);
                debug!(name = %self.name, "watchdog tripped");
                return Ok(());
            }
            if deadline.expired(now) {
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                return Err(Error::TimedOut);
            }

            let target = deadline.sleep_target(trip_at.min(now + self.max_sleep));
            tokio::select! {
                _ = self.closed.wait() => return Ok(()),
                _ = time::sleep_until(target) => {}
            }
        }
    }

    /// Copy out the stats block.
    pub fn snapshot(&self) -> WatchdogStats {
        self.stats.snapshot()
    }
}

impl Closable for Watchdog {
    fn close(&self) {
        self.closed.set();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_SLEEP: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn trips_when_kicks_stop() {
        let watchdog = Watchdog::new("w", Duration::from_millis(100), MAX_SLEEP);

        let start = Instant::now();
        watchdog.wait(Deadline::from_millis(200)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(100));

        let stats = watchdog.snapshot();
        assert_eq!(stats.triggered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn live_kicks_hold_off_a_waiter() {
        let watchdog = Watchdog::new("w", Duration::from_millis(500), MAX_SLEEP);
        watchdog.kick(Duration::from_millis(500));

        let err = watchdog.wait(Deadline::from_millis(100)).await.unwrap_err();
        assert_eq!(err, Error::TimedOut);
        assert_eq!(watchdog.snapshot().timed_out, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn kick_during_wait_pushes_the_trip_out() {
        let watchdog = Watchdog::new("w", Duration::from_millis(100), MAX_SLEEP);

        let waiter = {
            let watchdog = watchdog.clone();
            tokio::spawn(async move {
                let start = Instant::now();
                watchdog.wait(Deadline::Forever).await.unwrap();
                start.elapsed()
            })
        };

        time::sleep(Duration::from_millis(50)).await;
        watchdog.kick(Duration::from_millis(100));

        assert_eq!(waiter.await.unwrap(), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn already_tripped_wait_returns_immediately() {
        let watchdog = Watchdog::new("w", Duration::ZERO, MAX_SLEEP);
        watchdog.wait(Deadline::Poll).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn poll_on_a_live_watchdog_times_out() {
        let watchdog = Watchdog::new("w", Duration::from_millis(100), MAX_SLEEP);
        assert_eq!(watchdog.wait(Deadline::Poll).await, Err(Error::TimedOut));
    }

    #[tokio::test(start_paused = true)]
    async fn kick_counts_accumulate() {
        let watchdog = Watchdog::new("w", Duration::from_millis(100), MAX_SLEEP);
        watchdog.kick(Duration::from_millis(100));
        watchdog.kick(Duration::from_millis(100));

        let stats = watchdog.snapshot();
        assert_eq!(stats.kicks, 2);
        assert!(stats.last_kick.is_some());
    }
}
