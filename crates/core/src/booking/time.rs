use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{
    errors::{SchedulerError, SchedulerResult},
    models::{
        booking::{BookingRequest, BookingTime},
        interval::TimeInterval,
    },
};

impl BookingTime {
    /// Picks the representation a request uses; the explicit pair wins.
    pub fn from_request(request: &BookingRequest) -> SchedulerResult<Self> {
        if let Some(start_iso) = non_empty(&request.start_iso) {
            return Ok(BookingTime::Explicit {
                start_iso: start_iso.to_string(),
                end_iso: non_empty(&request.end_iso).map(str::to_string),
            });
        }

        match (non_empty(&request.date), non_empty(&request.time)) {
            (Some(date), Some(time)) => Ok(BookingTime::Legacy {
                date: date.to_string(),
                time: time.to_string(),
            }),
            _ => Err(SchedulerError::invalid(
                "Missing required fields: startIso or date and time",
            )),
        }
    }

    /// Canonical `[start, end)` for this booking.
    ///
    /// Legacy times are wall-clock in `tz` and last `duration`; an explicit
    /// start without an end also gets `duration`.
    pub fn resolve(&self, tz: Tz, duration: Duration) -> SchedulerResult<TimeInterval> {
        let (start, end) = match self {
            BookingTime::Explicit { start_iso, end_iso } => {
                let start = parse_instant(start_iso, "startIso")?;
                let end = match end_iso {
                    Some(end_iso) => parse_instant(end_iso, "endIso")?,
                    None => end_after(start, duration)?,
                };
                (start, end)
            }
            BookingTime::Legacy { date, time } => {
                let start = legacy_start(date, time, tz)?;
                (start, end_after(start, duration)?)
            }
        };

        TimeInterval::new(start, end)
            .ok_or_else(|| SchedulerError::invalid("Meeting end must be after its start"))
    }
}

fn end_after(start: DateTime<Utc>, duration: Duration) -> SchedulerResult<DateTime<Utc>> {
    start
        .checked_add_signed(duration)
        .ok_or_else(|| SchedulerError::invalid("Meeting end is out of range"))
}

/// Parses `h:mm AM`/`h:mm PM` (case-insensitive, space optional); without a
/// suffix the value is read as 24-hour `HH:MM`.
pub fn parse_twelve_hour(value: &str) -> Option<NaiveTime> {
    let value = value.trim().to_ascii_uppercase();
    let (clock, meridiem) = if let Some(clock) = value.strip_suffix("AM") {
        (clock.trim_end(), Some(false))
    } else if let Some(clock) = value.strip_suffix("PM") {
        (clock.trim_end(), Some(true))
    } else {
        (value.as_str(), None)
    };

    let (hour, minute) = clock.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn legacy_start(date: &str, time: &str, tz: Tz) -> SchedulerResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| SchedulerError::invalid(format!("Invalid date: {date}")))?;
    let clock = parse_twelve_hour(time)
        .ok_or_else(|| SchedulerError::invalid(format!("Invalid time: {time}")))?;

    tz.from_local_datetime(&date.and_time(clock))
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .ok_or_else(|| {
            SchedulerError::invalid(format!("{date} {time} does not exist in {}", tz.name()))
        })
}

fn parse_instant(value: &str, field: &str) -> SchedulerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| SchedulerError::invalid(format!("Invalid {field}: {value}")))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
