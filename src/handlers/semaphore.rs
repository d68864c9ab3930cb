//! Semaphore handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use tollgate_constants::coordination::{
    DEFAULT_LEASE_EXPIRES_MS, DEFAULT_MAX_WAIT_MS, DEFAULT_SEMAPHORE_SIZE,
};
use tollgate_coordination::{Deadline, Semaphore, SemaphoreStats};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AcquireParams {
    #[serde(default = "default_size")]
    size: u64,
    #[serde(default = "default_expires")]
    expires: u64,
    #[serde(default = "default_maxwait")]
    maxwait: i64,
    /// A still-held key may be presented to re-acquire its lease.
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseParams {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

fn default_size() -> u64 {
    DEFAULT_SEMAPHORE_SIZE
}

fn default_expires() -> u64 {
    DEFAULT_LEASE_EXPIRES_MS
}

fn default_maxwait() -> i64 {
    DEFAULT_MAX_WAIT_MS
}

/// `GET /semaphore/{name}/acquire` - take a slot, returning the lease key
/// in the response body. Auto-creates the semaphore on first reference.
pub async fn acquire(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<AcquireParams>,
) -> Result<String, ApiError> {
    let arrival = Instant::now();
    if params.size == 0 {
        return Err(ApiError::invalid(
            "'size' must be a positive non-zero integer",
        ));
    }

    let (semaphore, created) = state
        .semaphores()
        .get_or_create(&name, || Semaphore::new(&name, params.size));
    if created {
        info!(name = %name, size = params.size, "semaphore created");
    } else {
        semaphore.reconfigure(params.size);
    }

    let result = semaphore
        .acquire(
            Deadline::from_millis(params.maxwait),
            Duration::from_millis(params.expires),
            params.key,
        )
        .await;
    info!(
        kind = "semaphore",
        call = "acquire",
        name = %name,
        size = params.size,
        expires = params.expires,
        maxwait = params.maxwait,
        wait = arrival.elapsed().as_millis() as u64,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "timeout" },
    );

    Ok(result?)
}

/// `GET /semaphore/{name}/release` - give the lease back. Releasing a key
/// that is unknown or already expired is a conflict.
pub async fn release(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ReleaseParams>,
) -> Result<StatusCode, ApiError> {
    let key = params
        .key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ApiError::invalid("'key' is required for release"))?;

    // resolve the name the same way acquire does: a release against a
    // never-referenced semaphore reports an unknown key, not a missing
    // primitive
    let (semaphore, created) = state
        .semaphores()
        .get_or_create(&name, || Semaphore::new(&name, DEFAULT_SEMAPHORE_SIZE));
    if created {
        info!(name = %name, size = DEFAULT_SEMAPHORE_SIZE, "semaphore created");
    }

    let result = semaphore.release(&key);
    info!(
        kind = "semaphore",
        call = "release",
        name = %name,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "conflict" },
    );

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /semaphore/{name}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SemaphoreStats>, ApiError> {
    match state.semaphores().get(&name) {
        Some(semaphore) => Ok(Json(semaphore.snapshot())),
        None => Err(ApiError::not_found("semaphore", name)),
    }
}

/// `DELETE /semaphore/{name}` - remove the semaphore, cancelling expiry
/// timers and releasing any parked waiters.
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.semaphores().delete(&name) {
        info!(kind = "semaphore", call = "delete", name = %name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("semaphore", name))
    }
}
