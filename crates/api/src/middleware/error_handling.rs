//! # Error Handling Middleware
//!
//! Maps scheduler errors to HTTP status codes and JSON error bodies so every
//! endpoint fails the same way.
//!
//! Upstream and internal failures are logged with their full detail; the
//! response only carries a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use slotsync_core::errors::SchedulerError;
use tracing::{error, warn};

pub const BOOKING_FAILED_MESSAGE: &str = "Failed to book discovery call";
pub const UPSTREAM_MESSAGE: &str = "Calendar service temporarily unavailable";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application error wrapper that provides HTTP status code mapping.
///
/// Handlers return `Result<_, AppError>` and use `?` on
/// `SchedulerResult` values.
#[derive(Debug)]
pub struct AppError(pub SchedulerError);

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError(SchedulerError::NotFound(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SchedulerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SchedulerError::NotFound(_) => StatusCode::NOT_FOUND,
            SchedulerError::SlotTaken(_) => StatusCode::CONFLICT,
            SchedulerError::EventCreationFailed(_) => StatusCode::BAD_GATEWAY,
            SchedulerError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SchedulerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.0 {
            SchedulerError::InvalidRequest(message)
            | SchedulerError::NotFound(message)
            | SchedulerError::SlotTaken(message) => {
                warn!(%status, "{}", message);
                json!({ "error": message })
            }
            SchedulerError::EventCreationFailed(details) => {
                error!(%status, details = %details, "event creation failed");
                json!({ "error": BOOKING_FAILED_MESSAGE, "details": details })
            }
            SchedulerError::UpstreamUnavailable(report) => {
                error!(%status, "calendar backend unavailable: {:?}", report);
                json!({ "error": UPSTREAM_MESSAGE })
            }
            SchedulerError::Internal(err) => {
                error!(%status, "internal error: {}", err);
                json!({ "error": INTERNAL_MESSAGE })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        AppError(err)
    }
}

/// Unexpected `eyre` failures inside a handler are internal errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SchedulerError::Internal(err.into()))
    }
}

pub fn map_error(err: SchedulerError) -> Response {
    AppError(err).into_response()
}
