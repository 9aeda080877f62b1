//! # Booking Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use slotsync_core::{
    booking::{book_meeting, lookup_booking},
    models::booking::{BookingConfirmation, BookingLookupResponse, BookingRequest},
};
use std::sync::Arc;

use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
    #[serde(default)]
    pub booking_id: String,
}

/// Books a discovery call.
///
/// # Endpoint
///
/// ```text
/// POST /api/discovery/book
/// ```
///
/// Accepts either `startIso`/`endIso` or the legacy `date` + `time` pair
/// (`selectedDate`/`selectedTime` are accepted too).
///
/// # Errors
///
/// * `400` - missing name, contact or time; malformed time values
/// * `409` - slot became busy (only with the pre-booking re-check enabled)
/// * `502` - the calendar rejected the event
/// * `503` - calendar backend unavailable
#[axum::debug_handler]
pub async fn book(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let confirmation =
        book_meeting(state.calendar.as_ref(), &state.scheduler, &request, Utc::now()).await?;

    Ok(Json(confirmation))
}

/// Looks a booking up by the id returned from [`book`].
///
/// # Endpoint
///
/// ```text
/// GET /api/discovery/lookup?bookingId=DISC-1767225600000-K3J9ZQ2XA
/// ```
#[axum::debug_handler]
pub async fn lookup(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<BookingLookupResponse>, AppError> {
    lookup_booking(
        state.calendar.as_ref(),
        &state.scheduler,
        &query.booking_id,
        Utc::now(),
    )
    .await?
    .map(Json)
    .ok_or_else(|| AppError::not_found("Booking not found"))
}
