//! # Google Calendar Adapter
//!
//! Implements the scheduler's [`CalendarBackend`] against the Google Calendar
//! v3 REST API.
//!
//! Failure mapping:
//!
//! - transport errors, timeouts, 5xx, 401/403/429 and unreadable bodies become
//!   `UpstreamUnavailable`; the caller only sees a generic message
//! - any other 4xx on event insert becomes `EventCreationFailed` carrying the
//!   provider's status and message

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use eyre::{Result, WrapErr};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use slotsync_core::{
    calendar::{
        BusyBlock, CalendarBackend, CalendarEvent, CreatedEvent, EventAttendee, EventSearch,
        FreeBusyQuery, FreeBusyResponse, NewEvent, ReminderMethod,
    },
    errors::{SchedulerError, SchedulerResult},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::{
    auth::{AccessTokenProvider, MissingCredentials, ServiceAccountTokenProvider, StaticToken},
    config::GoogleCalendarConfig,
    models::{
        GoogleAttendee, GoogleBusyPeriod, GoogleCalendarItem, GoogleConferenceData,
        GoogleConferenceSolutionKey, GoogleCreateConferenceRequest, GoogleEvent, GoogleEventInsert,
        GoogleEventList, GoogleEventTime, GoogleExtendedProperties, GoogleFreeBusyRequest,
        GoogleFreeBusyResponse, GoogleReminderOverride, GoogleReminders,
    },
};

/// Longest provider message echoed back in `EventCreationFailed`.
const MAX_DETAIL_LEN: usize = 300;

#[derive(Clone, Copy)]
enum Operation {
    FreeBusy,
    InsertEvent,
    ListEvents,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::FreeBusy => "free/busy query",
            Operation::InsertEvent => "event insert",
            Operation::ListEvents => "event search",
        }
    }
}

pub struct GoogleCalendar {
    client: Client,
    api_base: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleCalendar {
    /// Builds the adapter from configuration.
    ///
    /// Missing credentials are not an error here; each call then fails with
    /// `UpstreamUnavailable`.
    pub fn new(config: &GoogleCalendarConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .wrap_err("Failed to build HTTP client")?;

        let tokens: Arc<dyn AccessTokenProvider> = match (
            &config.access_token,
            &config.credentials,
        ) {
            (Some(token), _) => Arc::new(StaticToken::new(token.clone())),
            (None, Some(credentials)) => Arc::new(ServiceAccountTokenProvider::new(
                client.clone(),
                credentials,
                &config.token_uri,
            )?),
            (None, None) => {
                warn!("Google Calendar credentials are not configured; calendar calls will fail");
                Arc::new(MissingCredentials)
            }
        };

        Ok(Self::with_token_provider(client, &config.api_base, tokens))
    }

    pub fn with_token_provider(
        client: Client,
        api_base: &str,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: Operation,
    ) -> SchedulerResult<T> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            error!(operation = operation.name(), "calendar request failed: {}", e);
            SchedulerError::upstream(format!("Calendar {} failed", operation.name()))
        })?;

        let response = check_status(response, operation).await?;
        response.json::<T>().await.map_err(|e| {
            error!(operation = operation.name(), "unreadable calendar response: {}", e);
            SchedulerError::upstream(format!("Unreadable calendar {} response", operation.name()))
        })
    }
}

async fn check_status(response: Response, operation: Operation) -> SchedulerResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(operation = operation.name(), %status, body = %body, "calendar API error");

    let rejected_payload = matches!(operation, Operation::InsertEvent)
        && status.is_client_error()
        && !matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        );

    if rejected_payload {
        return Err(SchedulerError::EventCreationFailed(format!(
            "Google Calendar rejected the event ({}): {}",
            status.as_u16(),
            provider_message(&body)
        )));
    }

    Err(SchedulerError::upstream(format!(
        "Calendar {} returned {}",
        operation.name(),
        status
    )))
}

/// The `error.message` field of a Google error body, or a trimmed raw body.
fn provider_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    message.chars().take(MAX_DETAIL_LEN).collect()
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn reminder_method(method: ReminderMethod) -> &'static str {
    match method {
        ReminderMethod::Email => "email",
        ReminderMethod::Popup => "popup",
    }
}

fn insert_payload(event: &NewEvent) -> GoogleEventInsert {
    let time = |instant: DateTime<Utc>| GoogleEventTime {
        date_time: Some(rfc3339(instant)),
        date: None,
        time_zone: Some(event.time_zone.name().to_string()),
    };

    GoogleEventInsert {
        summary: event.summary.clone(),
        description: event.description.clone(),
        start: time(event.start),
        end: time(event.end),
        attendees: event
            .attendees
            .iter()
            .map(|email| GoogleAttendee {
                email: Some(email.clone()),
                display_name: None,
            })
            .collect(),
        conference_data: GoogleConferenceData {
            create_request: Some(GoogleCreateConferenceRequest {
                request_id: event.conference_request_id.clone(),
                conference_solution_key: GoogleConferenceSolutionKey {
                    kind: "hangoutsMeet".to_string(),
                },
            }),
            entry_points: Vec::new(),
        },
        reminders: GoogleReminders {
            use_default: false,
            overrides: event
                .reminders
                .iter()
                .map(|r| GoogleReminderOverride {
                    method: reminder_method(r.method).to_string(),
                    minutes: r.minutes_before,
                })
                .collect(),
        },
        extended_properties: GoogleExtendedProperties {
            private: event.private_properties.clone(),
        },
    }
}

fn event_start(time: &GoogleEventTime) -> Option<DateTime<Utc>> {
    if let Some(date_time) = &time.date_time {
        return DateTime::parse_from_rfc3339(date_time)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    // All-day events carry a bare date.
    time.date
        .as_deref()
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<GoogleEvent> for CalendarEvent {
    fn from(event: GoogleEvent) -> Self {
        let meeting_link = event.meeting_link();
        CalendarEvent {
            start: event.start.as_ref().and_then(event_start),
            meeting_link,
            attendees: event
                .attendees
                .into_iter()
                .map(|a| EventAttendee {
                    email: a.email,
                    display_name: a.display_name,
                })
                .collect(),
            private_properties: event
                .extended_properties
                .map(|p| p.private)
                .unwrap_or_default(),
            event_id: event.id,
            summary: event.summary,
            description: event.description,
        }
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendar {
    async fn query_free_busy(&self, query: &FreeBusyQuery) -> SchedulerResult<FreeBusyResponse> {
        let body = GoogleFreeBusyRequest {
            time_min: rfc3339(query.time_min),
            time_max: rfc3339(query.time_max),
            time_zone: query.time_zone.name().to_string(),
            items: query
                .calendar_ids
                .iter()
                .map(|id| GoogleCalendarItem { id: id.clone() })
                .collect(),
        };

        let request = self.client.post(format!("{}/freeBusy", self.api_base)).json(&body);
        let response: GoogleFreeBusyResponse = self.send(request, Operation::FreeBusy).await?;

        let calendars = response
            .calendars
            .into_iter()
            .map(|(calendar_id, calendar)| {
                for problem in &calendar.errors {
                    warn!(
                        calendar_id = %calendar_id,
                        domain = ?problem.domain,
                        reason = ?problem.reason,
                        "calendar reported a free/busy error; treating it as free"
                    );
                }
                let blocks = calendar
                    .busy
                    .into_iter()
                    .map(|GoogleBusyPeriod { start, end }| BusyBlock { start, end })
                    .collect();
                (calendar_id, blocks)
            })
            .collect::<FreeBusyResponse>();

        debug!(calendars = calendars.len(), "free/busy response received");
        Ok(calendars)
    }

    async fn create_event(&self, event: &NewEvent) -> SchedulerResult<CreatedEvent> {
        let request = self
            .client
            .post(self.events_url(&event.calendar_id))
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .json(&insert_payload(event));

        let created: GoogleEvent = self.send(request, Operation::InsertEvent).await?;
        Ok(CreatedEvent {
            meeting_link: created.meeting_link(),
            event_id: created.id,
        })
    }

    async fn search_events(&self, search: &EventSearch) -> SchedulerResult<Vec<CalendarEvent>> {
        let request = self.client.get(self.events_url(&search.calendar_id)).query(&[
            ("timeMin", rfc3339(search.time_min)),
            ("timeMax", rfc3339(search.time_max)),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("q", search.text.clone()),
        ]);

        let list: GoogleEventList = self.send(request, Operation::ListEvents).await?;
        Ok(list.items.into_iter().map(CalendarEvent::from).collect())
    }
}
