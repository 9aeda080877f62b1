//! # Booking
//!
//! Turns a booking request into a calendar event and finds it again later.
//!
//! Availability is not re-validated here unless
//! [`SchedulerConfig::recheck_before_booking`] is set, so two callers that saw
//! the same open slot can both book it. With the re-check on, the race window
//! shrinks to the gap between the free/busy call and the create call.

pub mod event;
pub mod id;
pub mod time;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    calendar::{CalendarBackend, CalendarEvent, EventSearch},
    errors::{SchedulerError, SchedulerResult},
    models::{
        booking::{
            BookingConfirmation, BookingId, BookingLookupResponse, BookingRequest, BookingTime,
        },
        config::SchedulerConfig,
        interval::TimeInterval,
        slot::time_label,
    },
    scheduling::{aggregate_busy, shifted},
};

use event::{BOOKING_ID_PROPERTY, CONTACT_PROPERTY, EventDraft, NAME_PROPERTY, build_event};
use id::mint_booking_id;

pub const CONFIRMATION_MESSAGE: &str = "Discovery call booked successfully!";

/// Books a discovery call and returns its confirmation.
///
/// The booking id is minted before the create call so the event can carry
/// it, but it only reaches the caller once the event exists.
pub async fn book_meeting(
    backend: &dyn CalendarBackend,
    config: &SchedulerConfig,
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> SchedulerResult<BookingConfirmation> {
    let slot = BookingTime::from_request(request)?
        .resolve(config.time_zone, config.booking_duration)?;

    let name = required(&request.name, "name")?;
    let contact = required(&request.contact, "contact")?;

    if config.recheck_before_booking {
        ensure_still_free(backend, config, slot).await?;
    }

    let booking_id = mint_booking_id(&config.booking_id_prefix, now);
    let event = build_event(
        config,
        EventDraft {
            booking_id: &booking_id,
            name,
            contact,
            slot,
            project: &request.project,
            conference_request_id: format!("discovery-{}", uuid::Uuid::new_v4()),
        },
    );

    let created = backend.create_event(&event).await?;

    info!(
        booking_id = %booking_id,
        event_id = %created.event_id,
        start = %slot.start(),
        has_meeting_link = created.meeting_link.is_some(),
        "discovery call booked"
    );

    Ok(BookingConfirmation {
        success: true,
        booking_id,
        event_id: created.event_id,
        meeting_link: created.meeting_link,
        message: CONFIRMATION_MESSAGE.to_string(),
    })
}

/// Best-effort reverse lookup of a booking by its id.
///
/// Searches the booking calendar for events within `lookup_window` of `now`
/// whose text mentions the id. `Ok(None)` when nothing matches.
pub async fn lookup_booking(
    backend: &dyn CalendarBackend,
    config: &SchedulerConfig,
    booking_id: &str,
    now: DateTime<Utc>,
) -> SchedulerResult<Option<BookingLookupResponse>> {
    let booking_id = booking_id.trim();
    if booking_id.is_empty() {
        return Err(SchedulerError::invalid("Missing bookingId"));
    }

    let search = EventSearch {
        calendar_id: config.booking_calendar_id.clone(),
        text: booking_id.to_string(),
        time_min: shifted(now, -config.lookup_window)?,
        time_max: shifted(now, config.lookup_window)?,
    };
    let events = backend.search_events(&search).await?;
    debug!(booking_id, candidates = events.len(), "booking lookup search");

    let found = events.into_iter().find(|event| {
        event.mentions(booking_id)
            || event
                .private_properties
                .get(BOOKING_ID_PROPERTY)
                .is_some_and(|id| id == booking_id)
    });

    Ok(found.map(|event| describe_booking(config, BookingId::new(booking_id), event)))
}

fn describe_booking(
    config: &SchedulerConfig,
    booking_id: BookingId,
    event: CalendarEvent,
) -> BookingLookupResponse {
    let attendee = event.attendees.first();
    let name = event
        .private_properties
        .get(NAME_PROPERTY)
        .cloned()
        .or_else(|| attendee.and_then(|a| a.display_name.clone()))
        .unwrap_or_else(|| "Guest".to_string());
    let contact = event
        .private_properties
        .get(CONTACT_PROPERTY)
        .cloned()
        .or_else(|| attendee.and_then(|a| a.email.clone()))
        .unwrap_or_default();

    let (date, time) = match event.start {
        Some(start) => (
            start
                .with_timezone(&config.time_zone)
                .format("%A, %B %-d, %Y")
                .to_string(),
            time_label(start, config.time_zone),
        ),
        None => {
            warn!(event_id = %event.event_id, "matched booking event has no start time");
            (String::new(), String::new())
        }
    };

    BookingLookupResponse {
        booking_id,
        name,
        contact,
        date,
        time,
        meeting_link: event.meeting_link.unwrap_or_default(),
    }
}

async fn ensure_still_free(
    backend: &dyn CalendarBackend,
    config: &SchedulerConfig,
    slot: TimeInterval,
) -> SchedulerResult<()> {
    let mut calendar_ids = config.calendar_ids.clone();
    if !calendar_ids.contains(&config.booking_calendar_id) {
        calendar_ids.push(config.booking_calendar_id.clone());
    }

    let busy = aggregate_busy(backend, &calendar_ids, slot, config.time_zone).await?;
    if busy.iter().any(|interval| interval.overlaps(&slot)) {
        warn!(start = %slot.start(), "requested slot became busy before booking");
        return Err(SchedulerError::SlotTaken(format!(
            "The slot starting at {} is no longer available",
            slot.start().to_rfc3339()
        )));
    }
    Ok(())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> SchedulerResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SchedulerError::invalid(format!("Missing required field: {field}")))
}
