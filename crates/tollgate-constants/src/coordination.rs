//! Defaults and bounds for the synchronization primitives.
//!
//! Wire durations are integer milliseconds throughout.

/// Default `maxwait` for every blocking operation: negative waits forever.
pub const DEFAULT_MAX_WAIT_MS: i64 = -1;

/// Default token bucket size (tokens per refill interval).
pub const DEFAULT_BUCKET_SIZE: u64 = 1;

/// Default token bucket refill interval.
pub const DEFAULT_BUCKET_INTERVAL_MS: u64 = 1_000;

/// Default semaphore slot count.
pub const DEFAULT_SEMAPHORE_SIZE: u64 = 1;

/// Default semaphore lease expiration. Zero would mean "never expires".
pub const DEFAULT_LEASE_EXPIRES_MS: u64 = 60_000;

/// Default watchdog expiration applied by a kick (or first reference).
pub const DEFAULT_WATCHDOG_EXPIRES_MS: u64 = 60_000;

/// Default barrier party count.
pub const DEFAULT_BARRIER_SIZE: u64 = 2;

/// Default counter increment.
pub const DEFAULT_COUNT_AMOUNT: i64 = 1;

/// Default counter reset value.
pub const DEFAULT_RESET_VALUE: i64 = 0;

/// Backoff between semaphore acquire attempts while all slots are held.
/// Expiry tasks free slots asynchronously, so acquire polls rather than
/// queueing behind a slot channel.
pub const ACQUIRE_POLL_INTERVAL_MS: u64 = 5;

/// Upper bound on any single sleep inside a wake loop. Keeps long waits
/// revisiting the caller deadline and the deletion latch.
pub const DEFAULT_MAX_SLEEP_MS: u64 = 5_000;
