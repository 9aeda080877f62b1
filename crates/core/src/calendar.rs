//! # Calendar Backend Boundary
//!
//! The scheduler talks to an external calendar through [`CalendarBackend`]
//! only. Adapters translate provider payloads into the plain types below and
//! map every transport or provider failure onto a
//! [`SchedulerError`](crate::errors::SchedulerError) kind before returning.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use mockall::automock;
use std::collections::{BTreeMap, HashMap};

use crate::errors::SchedulerResult;

/// Free/busy request covering one window and any number of calendars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeBusyQuery {
    pub calendar_ids: Vec<String>,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub time_zone: Tz,
}

/// A busy block exactly as the provider reported it.
///
/// Either timestamp may be missing or malformed; the aggregator decides what
/// survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyBlock {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl BusyBlock {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

/// Busy blocks keyed by calendar identifier.
pub type FreeBusyResponse = BTreeMap<String, Vec<BusyBlock>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderMethod {
    Email,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventReminder {
    pub method: ReminderMethod,
    pub minutes_before: u32,
}

/// Event to be created on the booking calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub calendar_id: String,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: Tz,
    pub attendees: Vec<String>,
    /// Idempotency key for the conferencing-link request
    pub conference_request_id: String,
    pub reminders: Vec<EventReminder>,
    /// Key/value pairs stored privately on the event
    pub private_properties: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub event_id: String,
    pub meeting_link: Option<String>,
}

/// Free-text event search over a time window on one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSearch {
    pub calendar_id: String,
    pub text: String,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttendee {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// An existing event returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarEvent {
    pub event_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub attendees: Vec<EventAttendee>,
    pub private_properties: HashMap<String, String>,
}

impl CalendarEvent {
    /// True when `needle` occurs in the summary or the description.
    pub fn mentions(&self, needle: &str) -> bool {
        [self.summary.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .any(|text| text.contains(needle))
    }
}

#[automock]
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// One free/busy call for every calendar in the query.
    async fn query_free_busy(&self, query: &FreeBusyQuery) -> SchedulerResult<FreeBusyResponse>;

    /// Creates the event and requests a conferencing link for it.
    async fn create_event(&self, event: &NewEvent) -> SchedulerResult<CreatedEvent>;

    /// Events in the window whose searchable text matches, ordered by start.
    async fn search_events(&self, search: &EventSearch) -> SchedulerResult<Vec<CalendarEvent>>;
}
