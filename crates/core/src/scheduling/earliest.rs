use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::{
    AvailabilityScope,
    shifted,
    aggregate::aggregate_busy,
    slots::{day_window, open_slots},
};
use crate::{
    calendar::CalendarBackend,
    errors::{SchedulerError, SchedulerResult},
    models::{
        config::{BusinessHours, SchedulerConfig},
        interval::TimeInterval,
        slot::CandidateSlot,
    },
};

/// First open slot in `[now + lead_time, now + lead_time + horizon)`.
///
/// Busy data for the whole horizon is fetched in one backend call. `Ok(None)`
/// means nothing is free in the horizon, which is an ordinary outcome.
pub async fn find_earliest_slot(
    backend: &dyn CalendarBackend,
    config: &SchedulerConfig,
    scope: &AvailabilityScope,
    now: DateTime<Utc>,
) -> SchedulerResult<Option<CandidateSlot>> {
    let search_start = shifted(now, config.lead_time)?;
    let window = TimeInterval::new(search_start, shifted(search_start, config.horizon)?)
        .ok_or_else(|| SchedulerError::invalid("search horizon must be positive"))?;

    let busy = aggregate_busy(backend, &scope.calendar_ids, window, scope.time_zone).await?;
    let found = earliest_slot_in(window, scope.time_zone, &config.business_hours, &busy);

    match &found {
        Some(slot) => debug!(start = %slot.start, "earliest open slot found"),
        None => debug!(
            from = %window.start(),
            until = %window.end(),
            "no open slot in search horizon"
        ),
    }

    Ok(found)
}

/// Walks local dates across `window` and returns the first open slot.
///
/// Only slots that start at or after `window.start()` and end by
/// `window.end()` qualify, since busy data outside the window is unknown.
pub fn earliest_slot_in(
    window: TimeInterval,
    tz: Tz,
    hours: &BusinessHours,
    busy: &[TimeInterval],
) -> Option<CandidateSlot> {
    let first_day = window.start().with_timezone(&tz).date_naive();
    let last_day = window.end().with_timezone(&tz).date_naive();

    first_day
        .iter_days()
        .take_while(|date| *date <= last_day)
        .find_map(|date| {
            let day_busy: Vec<TimeInterval> = match day_window(date, tz) {
                Some(day) => busy.iter().filter(|b| b.overlaps(&day)).copied().collect(),
                None => busy.to_vec(),
            };
            open_slots(date, tz, hours, window.start(), Some(window.end()), &day_busy).next()
        })
}
