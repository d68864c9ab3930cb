//! Process-local synchronization primitives behind the tollgate service.
//!
//! Six named primitive kinds share a uniform contract: auto-creation on
//! first reference, a tri-modal `maxwait` on every blocking operation,
//! per-primitive statistics, and deletion that releases current waiters:
//!
//! - [`TokenBucket`] - periodic-refill rate limiting
//! - [`Semaphore`] - concurrency control with leased keys and expiry
//! - [`Event`] - one-shot broadcast of a payload
//! - [`Watchdog`] - reverse timer tripped when kicks stop
//! - [`Barrier`] - generational N-party rendezvous
//! - [`Counter`] - signed 64-bit atomic counter
//!
//! All state is volatile and owned by per-kind [`Registry`] maps. Blocking
//! operations park on [`Latch`] wake sources via the [`Deadline`] helper
//! and never leak timers or tasks on timeout.

mod barrier;
mod counter;
mod deadline;
mod error;
mod event;
mod keys;
mod latch;
mod metrics;
mod registry;
mod semaphore;
mod token_bucket;
mod watchdog;

pub use barrier::Barrier;
pub use counter::Counter;
pub use deadline::Deadline;
pub use deadline::wait_latch;
pub use error::Error;
pub use error::Result;
pub use event::Event;
pub use keys::generate_key;
pub use latch::Latch;
pub use metrics::BarrierStats;
pub use metrics::CounterStats;
pub use metrics::EventStats;
pub use metrics::SemaphoreStats;
pub use metrics::TokenBucketStats;
pub use metrics::WatchdogStats;
pub use registry::Closable;
pub use registry::Registry;
pub use semaphore::Semaphore;
pub use token_bucket::TokenBucket;
pub use watchdog::Watchdog;
