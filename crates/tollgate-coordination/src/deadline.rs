//! Tri-modal wait deadlines.
//!
//! Every blocking operation takes a `maxwait` in wire milliseconds with
//! three regimes: negative waits forever, zero polls once, positive waits
//! until a resolved instant. [`Deadline`] captures the regime at request
//! arrival so repeated checks inside a wake loop stay consistent.

use std::time::Duration;

use tokio::time::{self, Instant};

use crate::error::Error;
use crate::latch::Latch;

/// A wait bound decoded from wire milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// `maxwait < 0`: no timeout branch.
    Forever,
    /// `maxwait == 0`: check once, never park.
    Poll,
    /// `maxwait > 0`: wait until the resolved instant.
    Until(Instant),
}

impl Deadline {
    /// Decode a `maxwait` value, resolving positive waits against now.
    /// A wait too far in the future to represent degrades to `Forever`.
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            ms if ms < 0 => Deadline::Forever,
            0 => Deadline::Poll,
            ms => match Instant::now().checked_add(Duration::from_millis(ms as u64)) {
                Some(t) => Deadline::Until(t),
                None => Deadline::Forever,
            },
        }
    }

    /// Whether a wake loop is out of budget at `now`. `Poll` is always
    /// out of budget: it gets exactly one attempt before this is asked.
    pub fn expired(&self, now: Instant) -> bool {
        match self {
            Deadline::Forever => false,
            Deadline::Poll => true,
            Deadline::Until(t) => now >= *t,
        }
    }

    /// Clamp a wake loop's desired sleep target to this deadline. Callers
    /// cap `wanted` with their own maximum sleep before clamping.
    pub fn sleep_target(&self, wanted: Instant) -> Instant {
        match self {
            Deadline::Until(t) => wanted.min(*t),
            _ => wanted,
        }
    }
}

/// Block on `latch` until it trips or the deadline passes.
///
/// The positive regime runs under `timeout_at`, which releases its timer on
/// every exit path. The poll regime never registers a waiter.
pub async fn wait_latch(latch: &Latch, deadline: Deadline) -> Result<(), Error> {
    match deadline {
        Deadline::Forever => {
            latch.wait().await;
            Ok(())
        }
        Deadline::Poll => {
            if latch.is_set() {
                Ok(())
            } else {
                Err(Error::TimedOut)
            }
        }
        Deadline::Until(t) => time::timeout_at(t, latch.wait())
            .await
            .map_err(|_| Error::TimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_millis_selects_regime() {
        assert_eq!(Deadline::from_millis(-1), Deadline::Forever);
        assert_eq!(Deadline::from_millis(i64::MIN), Deadline::Forever);
        assert_eq!(Deadline::from_millis(0), Deadline::Poll);
        assert!(matches!(Deadline::from_millis(10), Deadline::Until(_)));
    }

    #[test]
    fn from_millis_handles_unrepresentable_waits() {
        // must not panic; anything this far out is effectively forever
        let deadline = Deadline::from_millis(i64::MAX);
        assert!(matches!(
            deadline,
            Deadline::Until(_) | Deadline::Forever
        ));
    }

    #[tokio::test]
    async fn poll_on_unset_latch_times_out_immediately() {
        let latch = Latch::new();
        assert_eq!(
            wait_latch(&latch, Deadline::Poll).await,
            Err(Error::TimedOut)
        );

        latch.set();
        assert_eq!(wait_latch(&latch, Deadline::Poll).await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_times_out_at_deadline() {
        let latch = Latch::new();
        let deadline = Deadline::from_millis(50);

        let start = Instant::now();
        let result = wait_latch(&latch, deadline).await;
        assert_eq!(result, Err(Error::TimedOut));
        assert_eq!(start.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_observes_trip() {
        let latch = Latch::new();
        let waiter = {
            let latch = latch.clone();
            tokio::spawn(async move { wait_latch(&latch, Deadline::from_millis(1_000)).await })
        };

        time::sleep(Duration::from_millis(10)).await;
        latch.set();
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn forever_wait_observes_trip() {
        let latch = Latch::new();
        let waiter = {
            let latch = latch.clone();
            tokio::spawn(async move { wait_latch(&latch, Deadline::Forever).await })
        };

        latch.set();
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[test]
    fn sleep_target_clamps_to_deadline() {
        let now = Instant::now();
        let deadline = Deadline::Until(now + Duration::from_millis(10));
        let wanted = now + Duration::from_millis(100);
        assert_eq!(deadline.sleep_target(wanted), now + Duration::from_millis(10));
        assert_eq!(Deadline::Forever.sleep_target(wanted), wanted);
    }
}
