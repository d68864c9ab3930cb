//! Request-boundary error mapping.
//!
//! The status code is authoritative; the body carries a short
//! human-readable sentence.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snafu::Snafu;
use tollgate_coordination::Error as CoordinationError;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Snafu)]
pub enum ApiError {
    /// The caller's `maxwait` deadline elapsed (408).
    #[snafu(display("timeout: 'maxwait' exceeded while waiting"))]
    TimedOut,

    /// The operation conflicts with the primitive's state (409).
    #[snafu(display("{message}"))]
    Conflict { message: String },

    /// Stats or delete of a primitive that does not exist (404).
    #[snafu(display("not found: no {kind} named '{name}'"))]
    NotFound { kind: &'static str, name: String },

    /// The query string was malformed or out of range (400).
    #[snafu(display("request: {message}"))]
    InvalidParameter { message: String },
}

impl ApiError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ApiError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidParameter {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::TimedOut => StatusCode::REQUEST_TIMEOUT,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<CoordinationError> for ApiError {
    fn from(err: CoordinationError) -> Self {
        match err {
            CoordinationError::TimedOut => ApiError::TimedOut,
            conflict => ApiError::Conflict {
                message: conflict.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
