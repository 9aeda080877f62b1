use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::interval::TimeInterval;

/// A grid-aligned candidate meeting time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Local 12-hour label, e.g. "9:15 AM"
    pub label: String,
}

impl CandidateSlot {
    pub fn interval(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.start, self.end)
    }

    /// Local calendar date of the slot start in `tz`.
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.start.with_timezone(&tz).date_naive()
    }
}

/// Formats an instant as a 12-hour wall-clock label in `tz`.
pub fn time_label(instant: DateTime<Utc>, tz: Tz) -> String {
    tz.from_utc_datetime(&instant.naive_utc())
        .format("%-I:%M %p")
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub label: String,
    pub start_iso: DateTime<Utc>,
    pub end_iso: DateTime<Utc>,
    pub available: bool,
}

impl From<CandidateSlot> for SlotResponse {
    fn from(slot: CandidateSlot) -> Self {
        Self {
            label: slot.label,
            start_iso: slot.start,
            end_iso: slot.end,
            available: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsResponse {
    pub date: NaiveDate,
    pub time_zone: String,
    pub slots: Vec<SlotResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarliestSlotResponse {
    pub date: NaiveDate,
    pub time: String,
    pub start_iso: DateTime<Utc>,
    pub end_iso: DateTime<Utc>,
    pub time_zone: String,
}

impl EarliestSlotResponse {
    pub fn from_slot(slot: CandidateSlot, tz: Tz) -> Self {
        Self {
            date: slot.local_date(tz),
            time: slot.label,
            start_iso: slot.start,
            end_iso: slot.end,
            time_zone: tz.name().to_string(),
        }
    }
}
