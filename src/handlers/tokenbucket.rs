//! Token bucket handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use tollgate_constants::coordination::{
    DEFAULT_BUCKET_INTERVAL_MS, DEFAULT_BUCKET_SIZE, DEFAULT_MAX_WAIT_MS,
};
use tollgate_coordination::{Deadline, TokenBucket, TokenBucketStats};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AcquireParams {
    #[serde(default = "default_size")]
    size: u64,
    #[serde(default = "default_interval")]
    interval: u64,
    #[serde(default = "default_maxwait")]
    maxwait: i64,
    #[serde(default)]
    id: Option<String>,
}

fn default_size() -> u64 {
    DEFAULT_BUCKET_SIZE
}

fn default_interval() -> u64 {
    DEFAULT_BUCKET_INTERVAL_MS
}

fn default_maxwait() -> i64 {
    DEFAULT_MAX_WAIT_MS
}

/// `GET /tokenbucket/{name}/acquire` - take one token, waiting up to
/// `maxwait` for a refill. Auto-creates the bucket on first reference.
pub async fn acquire(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<AcquireParams>,
) -> Result<StatusCode, ApiError> {
    let arrival = Instant::now();
    if params.size == 0 {
        return Err(ApiError::invalid(
            "'size' must be a positive non-zero integer",
        ));
    }
    if params.interval == 0 {
        return Err(ApiError::invalid(
            "'interval' must be a positive non-zero integer",
        ));
    }

    let interval = Duration::from_millis(params.interval);
    let (bucket, created) = state.buckets().get_or_create(&name, || {
        TokenBucket::new(&name, params.size, interval, state.max_sleep())
    });
    if created {
        info!(name = %name, size = params.size, interval = params.interval, "token bucket created");
    } else {
        bucket.reconfigure(params.size, interval);
    }

    let result = bucket
        .acquire(Deadline::from_millis(params.maxwait), arrival)
        .await;
    info!(
        kind = "tokenbucket",
        call = "acquire",
        name = %name,
        size = params.size,
        interval = params.interval,
        maxwait = params.maxwait,
        wait = arrival.elapsed().as_millis() as u64,
        id = params.id.as_deref().unwrap_or(""),
        status = if result.is_ok() { "success" } else { "timeout" },
    );

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /tokenbucket/{name}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TokenBucketStats>, ApiError> {
    match state.buckets().get(&name) {
        Some(bucket) => Ok(Json(bucket.snapshot())),
        None => Err(ApiError::not_found("tokenbucket", name)),
    }
}

/// `DELETE /tokenbucket/{name}` - remove the bucket, releasing any
/// parked waiters.
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.buckets().delete(&name) {
        info!(kind = "tokenbucket", call = "delete", name = %name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("tokenbucket", name))
    }
}
