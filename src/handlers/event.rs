//! Event handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use tollgate_constants::coordination::DEFAULT_MAX_WAIT_MS;
use tollgate_coordination::{Deadline, Event, EventStats};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WaitParams {
    #[serde(default = "default_maxwait")]
    maxwait: i64,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendParams {
    #[serde(default)]
    message: String,
    #[serde(default)]
    id: Option<String>,
}

fn default_maxwait() -> i64 {
    DEFAULT_MAX_WAIT_MS
}

/// `GET /event/{name}/wait` - wait for the event; the response body is the
/// payload of the send. Returns immediately if already sent.
pub async fn wait(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<WaitParams>,
) -> Result<String, ApiError> {
    let arrival = Instant::now();
    let (event, created) = state.events().get_or_create(&name, || Event::new(&name));
    if created {
        info!(name = %name, "event created");
    }

    let result = event.wait(Deadline::from_millis(params.maxwait)).await;
    info!(
        kind = "event",
        call = "wait",
        name = %name,
        maxwait = params.maxwait,
        wait = arrival.elapsed().as_millis() as u64,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "timeout" },
    );

    Ok(result?)
}

/// `GET /event/{name}/send` - trigger the event, waking every waiter with
/// the given message. A second send is a conflict.
pub async fn send(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<SendParams>,
) -> Result<StatusCode, ApiError> {
    let (event, created) = state.events().get_or_create(&name, || Event::new(&name));
    if created {
        info!(name = %name, "event created");
    }

    let result = event.send(params.message);
    info!(
        kind = "event",
        call = "send",
        name = %name,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "conflict" },
    );

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /event/{name}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<EventStats>, ApiError> {
    match state.events().get(&name) {
        Some(event) => Ok(Json(event.snapshot())),
        None => Err(ApiError::not_found("event", name)),
    }
}

/// `DELETE /event/{name}` - remove the event. Waiters on an unsent event
/// complete normally with an empty payload.
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.events().delete(&name) {
        info!(kind = "event", call = "delete", name = %name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("event", name))
    }
}
