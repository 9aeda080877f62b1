use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::{
    config::BusinessHours,
    interval::TimeInterval,
    slot::{CandidateSlot, time_label},
};

/// The local day `[midnight, next midnight)` of `date` in `tz`, as UTC.
///
/// Days shortened or lengthened by a DST switch come out as 23 or 25 hours.
pub fn day_window(date: NaiveDate, tz: Tz) -> Option<TimeInterval> {
    let start = start_of_local_day(date, tz)?;
    let end = start_of_local_day(date.succ_opt()?, tz)?;
    TimeInterval::new(start, end)
}

/// Open grid slots on `date` that start at or after `now + lead_time`.
///
/// Candidates are built at local `date@h:m` for every hour in business hours
/// and every multiple of the slot length below 60 minutes, so the output is
/// strictly increasing by start. A candidate is kept only when no interval in
/// `busy` overlaps it.
pub fn generate_day_slots(
    date: NaiveDate,
    tz: Tz,
    hours: &BusinessHours,
    lead_time: Duration,
    now: DateTime<Utc>,
    busy: &[TimeInterval],
) -> Vec<CandidateSlot> {
    match now.checked_add_signed(lead_time) {
        Some(not_before) => open_slots(date, tz, hours, not_before, None, busy).collect(),
        None => Vec::new(),
    }
}

/// Lazily yields open slots on `date` within `[not_before, not_after]`.
///
/// Wall-clock times that do not exist on `date` (the spring-forward gap) are
/// skipped; ambiguous ones resolve to the earlier instant.
pub(crate) fn open_slots<'a>(
    date: NaiveDate,
    tz: Tz,
    hours: &BusinessHours,
    not_before: DateTime<Utc>,
    not_after: Option<DateTime<Utc>>,
    busy: &'a [TimeInterval],
) -> impl Iterator<Item = CandidateSlot> + 'a {
    let length = hours.slot_length();
    let step = hours.slot_minutes.max(1) as usize;

    (hours.start_hour..hours.end_hour)
        .flat_map(move |hour| (0..60).step_by(step).map(move |minute| (hour, minute)))
        .filter_map(move |(hour, minute)| {
            let wall_clock = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0)?);
            let start = tz.from_local_datetime(&wall_clock).earliest()?;
            Some(start.with_timezone(&Utc))
        })
        .filter(move |start| *start >= not_before)
        .map(move |start| (start, start + length))
        .filter(move |(_, end)| not_after.is_none_or(|limit| *end <= limit))
        .filter_map(move |(start, end)| {
            let candidate = TimeInterval::new(start, end)?;
            let free = !busy.iter().any(|interval| interval.overlaps(&candidate));
            free.then(|| CandidateSlot {
                start,
                end,
                label: time_label(start, tz),
            })
        })
}

fn start_of_local_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    // Some zones skip midnight on DST days; the day then starts at the first
    // wall-clock hour that exists.
    (0..3).find_map(|hour| {
        let wall_clock = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0)?);
        tz.from_local_datetime(&wall_clock)
            .earliest()
            .map(|start| start.with_timezone(&Utc))
    })
}
