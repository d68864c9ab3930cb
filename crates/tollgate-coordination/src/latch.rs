//! One-shot broadcast latch.

use tokio_util::sync::CancellationToken;

/// A one-shot broadcast wake source.
///
/// Once set, every current and future waiter observes completion. Setting
/// is idempotent. Clones share the same underlying signal, so a waiter can
/// capture the latch under a lock and block on it after releasing the lock.
#[derive(Debug, Clone, Default)]
pub struct Latch {
    token: CancellationToken,
}

impl Latch {
    /// Create an unset latch.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Trip the latch, waking all waiters.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// Whether the latch has been tripped.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the latch is tripped. Completes immediately if it
    /// already has been.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}
