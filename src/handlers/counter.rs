//! Counter handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;

use tollgate_constants::coordination::{DEFAULT_COUNT_AMOUNT, DEFAULT_RESET_VALUE};
use tollgate_coordination::{Counter, CounterStats};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CountParams {
    #[serde(default = "default_amount")]
    amount: i64,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetParams {
    #[serde(default = "default_value")]
    value: i64,
    #[serde(default)]
    id: Option<String>,
}

fn default_amount() -> i64 {
    DEFAULT_COUNT_AMOUNT
}

fn default_value() -> i64 {
    DEFAULT_RESET_VALUE
}

/// `GET /counter/{name}/count` - add `amount` (which may be negative) and
/// return the post-increment value as a decimal integer.
pub async fn count(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<CountParams>,
) -> Result<String, ApiError> {
    let (counter, created) = state.counters().get_or_create(&name, || Counter::new(&name));
    if created {
        info!(name = %name, "counter created");
    }

    let value = counter.count(params.amount);
    info!(
        kind = "counter",
        call = "count",
        name = %name,
        amount = params.amount,
        value,
        id = params.id.as_deref().unwrap_or(""),
    );

    Ok(value.to_string())
}

/// `GET /counter/{name}/reset` - store `value` unconditionally.
pub async fn reset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ResetParams>,
) -> Result<StatusCode, ApiError> {
    let (counter, created) = state.counters().get_or_create(&name, || Counter::new(&name));
    if created {
        info!(name = %name, "counter created");
    }

    counter.reset(params.value);
    info!(
        kind = "counter",
        call = "reset",
        name = %name,
        value = params.value,
        id = params.id.as_deref().unwrap_or(""),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /counter/{name}/value` - return the current value as a decimal
/// integer.
pub async fn value(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<String, ApiError> {
    let (counter, created) = state.counters().get_or_create(&name, || Counter::new(&name));
    if created {
        info!(name = %name, "counter created");
    }

    Ok(counter.value().to_string())
}

/// `GET /counter/{name}/stats`
pub async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CounterStats>, ApiError> {
    match state.counters().get(&name) {
        Some(counter) => Ok(Json(counter.snapshot())),
        None => Err(ApiError::not_found("counter", name)),
    }
}

/// `DELETE /counter/{name}`
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.counters().delete(&name) {
        info!(kind = "counter", call = "delete", name = %name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("counter", name))
    }
}
