//! Watchdog handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use tollgate_constants::coordination::{DEFAULT_MAX_WAIT_MS, DEFAULT_WATCHDOG_EXPIRES_MS};
use tollgate_coordination::{Deadline, Watchdog, WatchdogStats};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KickParams {
    #[serde(default = "default_expires")]
    expires: u64,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaitParams {
    #[serde(default = "default_maxwait")]
    maxwait: i64,
    #[serde(default)]
    id: Option<String>,
}

fn default_expires() -> u64 {
    DEFAULT_WATCHDOG_EXPIRES_MS
}

fn default_maxwait() -> i64 {
    DEFAULT_MAX_WAIT_MS
}

/// `GET /watchdog/{name}/kick` - push the trip deadline out to
/// `now + expires`. Auto-creates the watchdog on first reference.
pub async fn kick(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<KickParams>,
) -> Result<StatusCode, ApiError> {
    let expires = Duration::from_millis(params.expires);
    let (watchdog, created) = state
        .watchdogs()
        .get_or_create(&name, || Watchdog::new(&name, expires, state.max_sleep()));
    if created {
        info!(name = %name, expires = params.expires, "watchdog created");
    }

    watchdog.kick(expires);
    info!(
        kind = "watchdog",
        call = "kick",
        name = %name,
        expires = params.expires,
        id = params.id.as_deref().unwrap_or(""),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /watchdog/{name}/wait` - block until the watchdog trips, i.e.
/// until the kicks stop. Returns immediately if already tripped.
pub async fn wait(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<WaitParams>,
) -> Result<StatusCode, ApiError> {
    let arrival = Instant::now();
    let (watchdog, created) = state.watchdogs().get_or_create(&name, || {
        Watchdog::new(
            &name,
            Duration::from_millis(DEFAULT_WATCHDOG_EXPIRES_MS),
            state.max_sleep(),
        )
    });
    if created {
        info!(name = %name, expires = DEFAULT_WATCHDOG_EXPIRES_MS, "watchdog created");
    }

    let result = watchdog.wait(Deadline::from_millis(params.maxwait)).await;
    info!(
        kind = "watchdog",
        call = "wait",
        name = %name,
        maxwait = params.maxwait,
        wait = arrival.elapsed().as_millis() as u64,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "timeout" },
    );

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /watchdog/{name}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<WatchdogStats>, ApiError> {
    match state.watchdogs().get(&name) {
        Some(watchdog) => Ok(Json(watchdog.snapshot())),
        None => Err(ApiError::not_found("watchdog", name)),
    }
}

/// `DELETE /watchdog/{name}` - remove the watchdog, releasing any
/// parked waiters.
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.watchdogs().delete(&name) {
        info!(kind = "watchdog", call = "delete", name = %name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("watchdog", name))
    }
}
