//! HTTP request handlers, one module per primitive kind.
//!
//! Each module holds per-operation typed query records (decoded with serde
//! defaults) and the handlers that bind them to the engine. Every
//! state-changing operation emits one structured log line carrying the
//! optional client-supplied `id` correlation field.

pub mod barrier;
pub mod counter;
pub mod event;
pub mod health;
pub mod semaphore;
pub mod tokenbucket;
pub mod watchdog;
