//! Error taxonomy for the coordination primitives.

use snafu::Snafu;

/// Errors surfaced by primitive operations.
///
/// Everything here is non-fatal: the primitive's state is left consistent
/// and the request boundary maps each kind to an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum Error {
    /// The caller's `maxwait` deadline elapsed before the operation could
    /// complete.
    #[snafu(display("timeout: 'maxwait' exceeded while waiting"))]
    TimedOut,

    /// A send was attempted on an event that was already sent and closed.
    #[snafu(display("conflict: event was already sent and closed"))]
    EventClosed,

    /// A semaphore release named a key that is not currently held.
    #[snafu(display("conflict: key '{key}' is invalid or already released"))]
    UnknownKey {
        /// The key the caller presented.
        key: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
