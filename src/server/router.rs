//! Axum router configuration.
//!
//! One route per operation, grouped by primitive kind. Blocking and
//! state-changing operations are plain `GET`s so any HTTP client can drive
//! them; removal is `DELETE`.
//!
//! ```text
//! /tokenbucket/{name}/acquire|stats   + DELETE /tokenbucket/{name}
//! /semaphore/{name}/acquire|release|stats + DELETE /semaphore/{name}
//! /event/{name}/wait|send|stats       + DELETE /event/{name}
//! /watchdog/{name}/kick|wait|stats    + DELETE /watchdog/{name}
//! /barrier/{name}/wait|stats          + DELETE /barrier/{name}
//! /counter/{name}/count|reset|value|stats + DELETE /counter/{name}
//! /.well-known/ready
//! ```

use axum::Router;
use axum::routing::{delete, get};

use crate::handlers::{barrier, counter, event, health, semaphore, tokenbucket, watchdog};
use crate::state::AppState;

/// Build the complete router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/tokenbucket/{name}/acquire", get(tokenbucket::acquire))
        .route("/tokenbucket/{name}/stats", get(tokenbucket::stats))
        .route("/tokenbucket/{name}", delete(tokenbucket::remove))
        .route("/semaphore/{name}/acquire", get(semaphore::acquire))
        .route("/semaphore/{name}/release", get(semaphore::release))
        .route("/semaphore/{name}/stats", get(semaphore::stats))
        .route("/semaphore/{name}", delete(semaphore::remove))
        .route("/event/{name}/wait", get(event::wait))
        .route("/event/{name}/send", get(event::send))
        .route("/event/{name}/stats", get(event::stats))
        .route("/event/{name}", delete(event::remove))
        .route("/watchdog/{name}/kick", get(watchdog::kick))
        .route("/watchdog/{name}/wait", get(watchdog::wait))
        .route("/watchdog/{name}/stats", get(watchdog::stats))
        .route("/watchdog/{name}", delete(watchdog::remove))
        .route("/barrier/{name}/wait", get(barrier::wait))
        .route("/barrier/{name}/stats", get(barrier::stats))
        .route("/barrier/{name}", delete(barrier::remove))
        .route("/counter/{name}/count", get(counter::count))
        .route("/counter/{name}/reset", get(counter::reset))
        .route("/counter/{name}/value", get(counter::value))
        .route("/counter/{name}/stats", get(counter::stats))
        .route("/counter/{name}", delete(counter::remove))
        .route("/.well-known/ready", get(health::ready))
        .with_state(state)
}
