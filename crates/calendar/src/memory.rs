//! Process-local calendar backend.
//!
//! Keeps busy blocks and created events in memory. Created events count as
//! busy time on their calendar, so booking a slot removes it from later
//! availability answers. Used for local development (`CALENDAR_BACKEND=memory`)
//! and the HTTP tests.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use slotsync_core::{
    calendar::{
        BusyBlock, CalendarBackend, CalendarEvent, CreatedEvent, EventAttendee, EventSearch,
        FreeBusyQuery, FreeBusyResponse, NewEvent,
    },
    errors::{SchedulerError, SchedulerResult},
    models::interval::TimeInterval,
};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::sync::RwLock;
use tracing::debug;

const MEETING_LINK_BASE: &str = "https://meet.example.com";

#[derive(Debug, Clone)]
struct StoredEvent {
    calendar_id: String,
    slot: TimeInterval,
    event: CalendarEvent,
}

#[derive(Debug, Default)]
struct State {
    busy: HashMap<String, Vec<TimeInterval>>,
    events: Vec<StoredEvent>,
}

#[derive(Debug, Default)]
pub struct InMemoryCalendar {
    state: RwLock<State>,
    next_id: AtomicU64,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a busy block on `calendar_id`.
    pub fn with_busy(mut self, calendar_id: &str, busy: TimeInterval) -> Self {
        self.state
            .get_mut()
            .busy
            .entry(calendar_id.to_string())
            .or_default()
            .push(busy);
        self
    }

    /// Every event created so far, oldest first.
    pub async fn created_events(&self) -> Vec<CalendarEvent> {
        self.state
            .read()
            .await
            .events
            .iter()
            .map(|stored| stored.event.clone())
            .collect()
    }
}

fn to_block(interval: &TimeInterval) -> BusyBlock {
    let format = |instant: DateTime<Utc>| instant.to_rfc3339_opts(SecondsFormat::Secs, true);
    BusyBlock::new(format(interval.start()), format(interval.end()))
}

#[async_trait]
impl CalendarBackend for InMemoryCalendar {
    async fn query_free_busy(&self, query: &FreeBusyQuery) -> SchedulerResult<FreeBusyResponse> {
        let state = self.state.read().await;
        let Some(window) = TimeInterval::new(query.time_min, query.time_max) else {
            return Ok(FreeBusyResponse::new());
        };

        let response = query
            .calendar_ids
            .iter()
            .map(|calendar_id| {
                let seeded = state.busy.get(calendar_id).into_iter().flatten();
                let booked = state
                    .events
                    .iter()
                    .filter(|stored| &stored.calendar_id == calendar_id)
                    .map(|stored| &stored.slot);

                let blocks = seeded
                    .chain(booked)
                    .filter(|busy| busy.overlaps(&window))
                    .map(to_block)
                    .collect();
                (calendar_id.clone(), blocks)
            })
            .collect();

        Ok(response)
    }

    async fn create_event(&self, event: &NewEvent) -> SchedulerResult<CreatedEvent> {
        let slot = TimeInterval::new(event.start, event.end).ok_or_else(|| {
            SchedulerError::EventCreationFailed("Event end must be after its start".to_string())
        })?;

        let event_id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let meeting_link = format!("{MEETING_LINK_BASE}/{event_id}");

        let stored = StoredEvent {
            calendar_id: event.calendar_id.clone(),
            slot,
            event: CalendarEvent {
                event_id: event_id.clone(),
                summary: Some(event.summary.clone()),
                description: Some(event.description.clone()),
                start: Some(event.start),
                meeting_link: Some(meeting_link.clone()),
                attendees: event
                    .attendees
                    .iter()
                    .map(|email| EventAttendee {
                        email: Some(email.clone()),
                        display_name: None,
                    })
                    .collect(),
                private_properties: event.private_properties.clone(),
            },
        };

        self.state.write().await.events.push(stored);
        debug!(event_id = %event_id, calendar_id = %event.calendar_id, "in-memory event created");

        Ok(CreatedEvent {
            event_id,
            meeting_link: Some(meeting_link),
        })
    }

    async fn search_events(&self, search: &EventSearch) -> SchedulerResult<Vec<CalendarEvent>> {
        let state = self.state.read().await;
        let mut matches: Vec<&StoredEvent> = state
            .events
            .iter()
            .filter(|stored| stored.calendar_id == search.calendar_id)
            .filter(|stored| {
                stored.slot.start() < search.time_max && stored.slot.end() > search.time_min
            })
            .filter(|stored| {
                stored.event.mentions(&search.text)
                    || stored.event.private_properties.values().any(|v| v.contains(&search.text))
            })
            .collect();

        matches.sort_by_key(|stored| stored.slot.start());
        Ok(matches.into_iter().map(|stored| stored.event.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn interval(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    fn new_event(
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> NewEvent {
        NewEvent {
            calendar_id: calendar_id.to_string(),
            summary: summary.to_string(),
            description: String::new(),
            start,
            end,
            time_zone: chrono_tz::America::New_York,
            attendees: vec!["guest@example.com".to_string()],
            conference_request_id: "discovery-test".to_string(),
            reminders: Vec::new(),
            private_properties: HashMap::new(),
        }
    }

    fn query(calendar_ids: &[&str]) -> FreeBusyQuery {
        FreeBusyQuery {
            calendar_ids: calendar_ids.iter().map(|id| id.to_string()).collect(),
            time_min: at(0, 0),
            time_max: at(23, 0),
            time_zone: chrono_tz::America::New_York,
        }
    }

    #[tokio::test]
    async fn free_busy_reports_seeded_and_booked_time() {
        let calendar = InMemoryCalendar::new().with_busy("team", interval(at(14, 0), at(15, 0)));
        calendar
            .create_event(&new_event("primary", at(16, 0), at(16, 30), "Discovery Call"))
            .await
            .unwrap();

        let response = calendar
            .query_free_busy(&query(&["team", "primary", "empty"]))
            .await
            .unwrap();

        assert_eq!(
            response["team"],
            vec![BusyBlock::new("2026-03-02T14:00:00Z", "2026-03-02T15:00:00Z")]
        );
        assert_eq!(
            response["primary"],
            vec![BusyBlock::new("2026-03-02T16:00:00Z", "2026-03-02T16:30:00Z")]
        );
        assert!(response["empty"].is_empty());
    }

    #[tokio::test]
    async fn free_busy_ignores_blocks_outside_the_window() {
        let calendar = InMemoryCalendar::new()
            .with_busy("team", interval(at(23, 0), at(23, 30)));

        let response = calendar.query_free_busy(&query(&["team"])).await.unwrap();
        assert!(response["team"].is_empty());
    }

    #[tokio::test]
    async fn created_events_get_sequential_ids_and_links() {
        let calendar = InMemoryCalendar::new();
        let first = calendar
            .create_event(&new_event("primary", at(14, 0), at(14, 30), "a"))
            .await
            .unwrap();
        let second = calendar
            .create_event(&new_event("primary", at(15, 0), at(15, 30), "b"))
            .await
            .unwrap();

        assert_eq!(first.event_id, "mem-1");
        assert_eq!(second.meeting_link.as_deref(), Some("https://meet.example.com/mem-2"));
        assert_eq!(calendar.created_events().await.len(), 2);
    }

    #[tokio::test]
    async fn inverted_event_is_rejected() {
        let calendar = InMemoryCalendar::new();
        let result = calendar
            .create_event(&new_event("primary", at(15, 0), at(14, 0), "bad"))
            .await;
        assert!(matches!(result, Err(SchedulerError::EventCreationFailed(_))));
    }

    #[tokio::test]
    async fn search_matches_text_and_orders_by_start() {
        let calendar = InMemoryCalendar::new();
        for (hour, summary) in [(16, "Call DISC-1"), (14, "Call DISC-1 follow-up"), (15, "Other")] {
            calendar
                .create_event(&new_event("primary", at(hour, 0), at(hour, 30), summary))
                .await
                .unwrap();
        }

        let found = calendar
            .search_events(&EventSearch {
                calendar_id: "primary".to_string(),
                text: "DISC-1".to_string(),
                time_min: at(0, 0),
                time_max: at(23, 0),
            })
            .await
            .unwrap();

        let starts: Vec<_> = found.iter().map(|e| e.start.unwrap()).collect();
        assert_eq!(starts, vec![at(14, 0), at(16, 0)]);
    }
}
