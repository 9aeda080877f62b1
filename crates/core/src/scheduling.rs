//! # Availability
//!
//! Busy-interval aggregation, per-day slot generation and the earliest-slot
//! search. Every function takes "now" explicitly and re-reads availability
//! from the backend on each call.

pub mod aggregate;
pub mod earliest;
pub mod slots;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::{
    calendar::CalendarBackend,
    errors::{SchedulerError, SchedulerResult},
    models::{config::SchedulerConfig, slot::CandidateSlot},
};

pub use aggregate::aggregate_busy;
pub use earliest::{earliest_slot_in, find_earliest_slot};
pub use slots::{day_window, generate_day_slots};

/// `instant + by`, or `Internal` when the result leaves chrono's range.
pub(crate) fn shifted(instant: DateTime<Utc>, by: Duration) -> SchedulerResult<DateTime<Utc>> {
    instant.checked_add_signed(by).ok_or_else(|| {
        SchedulerError::Internal(format!("{instant} shifted by {by} is out of range").into())
    })
}

/// Which calendars and which zone an availability request is evaluated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityScope {
    pub calendar_ids: Vec<String>,
    pub time_zone: Tz,
}

impl AvailabilityScope {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            calendar_ids: config.calendar_ids.clone(),
            time_zone: config.time_zone,
        }
    }
}

/// All open slots on `date`, fetching busy data for that local day only.
///
/// A day that ends before `now + lead_time` returns an empty list without
/// contacting the backend.
pub async fn list_day_slots(
    backend: &dyn CalendarBackend,
    config: &SchedulerConfig,
    scope: &AvailabilityScope,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> SchedulerResult<Vec<CandidateSlot>> {
    let Some(window) = day_window(date, scope.time_zone) else {
        debug!(%date, tz = %scope.time_zone, "no representable local day");
        return Ok(Vec::new());
    };

    if window.end() <= shifted(now, config.lead_time)? {
        debug!(%date, "day lies entirely inside the lead-time buffer");
        return Ok(Vec::new());
    }

    let busy = aggregate_busy(backend, &scope.calendar_ids, window, scope.time_zone).await?;

    Ok(generate_day_slots(
        date,
        scope.time_zone,
        &config.business_hours,
        config.lead_time,
        now,
        &busy,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{FreeBusyResponse, MockCalendarBackend};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn day_inside_lead_time_skips_the_backend() {
        let mut backend = MockCalendarBackend::new();
        backend.expect_query_free_busy().never();

        let config = SchedulerConfig::default();
        let scope = AvailabilityScope::from_config(&config);
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        let slots = list_day_slots(&backend, &config, &scope, date, now()).await.unwrap();
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn later_day_lists_the_grid() {
        let mut backend = MockCalendarBackend::new();
        backend
            .expect_query_free_busy()
            .times(1)
            .returning(|_| Ok(FreeBusyResponse::new()));

        let config = SchedulerConfig::default();
        let scope = AvailabilityScope::from_config(&config);
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();

        let slots = list_day_slots(&backend, &config, &scope, date, now()).await.unwrap();
        assert_eq!(slots.len(), 32);
    }

    #[tokio::test]
    async fn out_of_range_lead_time_is_an_error() {
        let mut backend = MockCalendarBackend::new();
        backend.expect_query_free_busy().never();

        let config = SchedulerConfig {
            lead_time: Duration::MAX,
            ..SchedulerConfig::default()
        };
        let scope = AvailabilityScope::from_config(&config);
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();

        let result = list_day_slots(&backend, &config, &scope, date, now()).await;
        assert!(matches!(result, Err(SchedulerError::Internal(_))));
    }
}
