//! Barrier handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use tollgate_constants::coordination::{DEFAULT_BARRIER_SIZE, DEFAULT_MAX_WAIT_MS};
use tollgate_coordination::{Barrier, BarrierStats, Deadline};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WaitParams {
    #[serde(default = "default_size")]
    size: u64,
    #[serde(default = "default_maxwait")]
    maxwait: i64,
    #[serde(default)]
    id: Option<String>,
}

fn default_size() -> u64 {
    DEFAULT_BARRIER_SIZE
}

fn default_maxwait() -> i64 {
    DEFAULT_MAX_WAIT_MS
}

/// `GET /barrier/{name}/wait` - block until `size` parties have arrived.
/// The barrier is generational: it resets after every trip and the next
/// cohort reuses the same name.
pub async fn wait(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<WaitParams>,
) -> Result<StatusCode, ApiError> {
    let arrival = Instant::now();
    if params.size == 0 {
        return Err(ApiError::invalid(
            "'size' must be a positive non-zero integer",
        ));
    }

    let (barrier, created) = state
        .barriers()
        .get_or_create(&name, || Barrier::new(&name, params.size));
    if created {
        info!(name = %name, size = params.size, "barrier created");
    } else {
        barrier.check_size(params.size);
    }

    let result = barrier.wait(Deadline::from_millis(params.maxwait)).await;
    info!(
        kind = "barrier",
        call = "wait",
        name = %name,
        size = params.size,
        maxwait = params.maxwait,
        wait = arrival.elapsed().as_millis() as u64,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "timeout" },
    );

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /barrier/{name}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BarrierStats>, ApiError> {
    match state.barriers().get(&name) {
        Some(barrier) => Ok(Json(barrier.snapshot())),
        None => Err(ApiError::not_found("barrier", name)),
    }
}

/// `DELETE /barrier/{name}` - remove the barrier, releasing any blocked
/// parties.
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.barriers().delete(&name) {
        info!(kind = "barrier", call = "delete", name = %name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("barrier", name))
    }
}
