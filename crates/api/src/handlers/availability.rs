//! # Availability Handlers
//!
//! Day availability and earliest-slot search. Both re-read free/busy data on
//! every request; nothing is cached between calls.
//!
//! Callers may narrow a request with `calendarIds` (comma-separated) and
//! `timeZone` query parameters. Overrides apply to that request only.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use slotsync_core::{
    errors::SchedulerError,
    models::slot::{DaySlotsResponse, EarliestSlotResponse, SlotResponse},
    scheduling::{AvailabilityScope, find_earliest_slot, list_day_slots},
};
use std::sync::Arc;
use tracing::debug;

use crate::{ApiState, middleware::error_handling::AppError};

/// Per-request overrides shared by both availability endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    /// Comma-separated calendar identifiers
    pub calendar_ids: Option<String>,
    /// IANA zone name, e.g. `Europe/Berlin`
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayQuery {
    /// Local date in `YYYY-MM-DD`
    pub date: Option<String>,
    #[serde(flatten)]
    pub scope: ScopeQuery,
}

impl ScopeQuery {
    /// Applies the overrides on top of the configured defaults.
    pub fn resolve(&self, state: &ApiState) -> Result<AvailabilityScope, AppError> {
        let mut scope = AvailabilityScope::from_config(&state.scheduler);

        if let Some(ids) = &self.calendar_ids {
            let ids: Vec<String> = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            if ids.is_empty() {
                return Err(AppError(SchedulerError::invalid(
                    "calendarIds must name at least one calendar",
                )));
            }
            scope.calendar_ids = ids;
        }

        if let Some(name) = self.time_zone.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            scope.time_zone = name.parse::<Tz>().map_err(|_| {
                AppError(SchedulerError::invalid(format!("Unknown time zone: {name}")))
            })?;
        }

        Ok(scope)
    }
}

/// Lists the open slots on one local date.
///
/// # Endpoint
///
/// ```text
/// GET /api/discovery/day-availability?date=2026-03-02
/// ```
///
/// # Errors
///
/// * `400` - `date` missing or not `YYYY-MM-DD`, bad overrides
/// * `503` - calendar backend unavailable
#[axum::debug_handler]
pub async fn day_availability(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DaySlotsResponse>, AppError> {
    let raw_date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError(SchedulerError::invalid("Missing required parameter: date")))?;

    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
        AppError(SchedulerError::invalid(format!(
            "Invalid date '{raw_date}': expected YYYY-MM-DD"
        )))
    })?;

    let scope = query.scope.resolve(&state)?;
    let slots = list_day_slots(
        state.calendar.as_ref(),
        &state.scheduler,
        &scope,
        date,
        Utc::now(),
    )
    .await?;

    debug!(%date, slots = slots.len(), "day availability computed");

    Ok(Json(DaySlotsResponse {
        date,
        time_zone: scope.time_zone.name().to_string(),
        slots: slots.into_iter().map(SlotResponse::from).collect(),
    }))
}

/// Finds the first open slot after the lead-time buffer.
///
/// # Endpoint
///
/// ```text
/// GET /api/discovery/earliest
/// ```
///
/// # Errors
///
/// * `404` - nothing free within the search horizon
/// * `503` - calendar backend unavailable
#[axum::debug_handler]
pub async fn earliest(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<EarliestSlotResponse>, AppError> {
    let scope = query.resolve(&state)?;
    let slot = find_earliest_slot(state.calendar.as_ref(), &state.scheduler, &scope, Utc::now())
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No available slots in the next {} days",
                state.scheduler.horizon_days()
            ))
        })?;

    Ok(Json(EarliestSlotResponse::from_slot(slot, scope.time_zone)))
}
