use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use reqwest::Client;
use serde_json::json;
use slotsync_calendar::{GoogleCalendar, GoogleCalendarConfig, auth::StaticToken};
use slotsync_core::{
    calendar::{BusyBlock, CalendarBackend, EventSearch, FreeBusyQuery, NewEvent},
    errors::SchedulerError,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

fn calendar(server: &MockServer) -> GoogleCalendar {
    GoogleCalendar::with_token_provider(
        Client::new(),
        &server.uri(),
        Arc::new(StaticToken::new("test-token")),
    )
}

fn new_event() -> NewEvent {
    NewEvent {
        calendar_id: "primary".to_string(),
        summary: "Discovery Call - Ada Lovelace".to_string(),
        description: "Booking Reference: DISC-1-ABC".to_string(),
        start: at(14, 0),
        end: at(14, 30),
        time_zone: chrono_tz::America::New_York,
        attendees: vec!["ada@example.com".to_string()],
        conference_request_id: "discovery-1".to_string(),
        reminders: Vec::new(),
        private_properties: HashMap::from([("bookingId".to_string(), "DISC-1-ABC".to_string())]),
    }
}

#[tokio::test]
async fn free_busy_sends_one_query_for_all_calendars() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/freeBusy"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "timeZone": "America/New_York",
            "items": [{"id": "primary"}, {"id": "team"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calendars": {
                "primary": {
                    "busy": [{"start": "2026-03-02T14:00:00Z", "end": "2026-03-02T15:00:00Z"}]
                },
                "team": {"busy": [], "errors": [{"domain": "global", "reason": "notFound"}]}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = calendar(&server)
        .query_free_busy(&FreeBusyQuery {
            calendar_ids: vec!["primary".to_string(), "team".to_string()],
            time_min: at(0, 0),
            time_max: at(23, 0),
            time_zone: chrono_tz::America::New_York,
        })
        .await
        .unwrap();

    assert_eq!(
        response["primary"],
        vec![BusyBlock::new("2026-03-02T14:00:00Z", "2026-03-02T15:00:00Z")]
    );
    assert!(response["team"].is_empty());
}

#[tokio::test]
async fn free_busy_server_error_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/freeBusy"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend down"))
        .mount(&server)
        .await;

    let result = calendar(&server)
        .query_free_busy(&FreeBusyQuery {
            calendar_ids: vec!["primary".to_string()],
            time_min: at(0, 0),
            time_max: at(23, 0),
            time_zone: chrono_tz::America::New_York,
        })
        .await;

    assert!(matches!(result, Err(SchedulerError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn create_event_requests_conference_and_notifies_attendees() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(query_param("conferenceDataVersion", "1"))
        .and(query_param("sendUpdates", "all"))
        .and(body_partial_json(json!({
            "summary": "Discovery Call - Ada Lovelace",
            "attendees": [{"email": "ada@example.com"}],
            "conferenceData": {"createRequest": {
                "requestId": "discovery-1",
                "conferenceSolutionKey": {"type": "hangoutsMeet"}
            }},
            "extendedProperties": {"private": {"bookingId": "DISC-1-ABC"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-123",
            "conferenceData": {"entryPoints": [
                {"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = calendar(&server).create_event(&new_event()).await.unwrap();

    assert_eq!(created.event_id, "evt-123");
    assert_eq!(
        created.meeting_link.as_deref(),
        Some("https://meet.google.com/abc-defg-hij")
    );
}

#[tokio::test]
async fn rejected_event_carries_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Invalid attendee email."}
        })))
        .mount(&server)
        .await;

    let result = calendar(&server).create_event(&new_event()).await;

    match result {
        Err(SchedulerError::EventCreationFailed(details)) => {
            assert!(details.contains("400"));
            assert!(details.contains("Invalid attendee email."));
        }
        other => panic!("expected EventCreationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_insert_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = calendar(&server).create_event(&new_event()).await;
    assert!(matches!(result, Err(SchedulerError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn search_lists_single_events_ordered_by_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("q", "DISC-1-ABC"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "evt-123",
                "summary": "Discovery Call - Ada Lovelace",
                "description": "Booking Reference: DISC-1-ABC",
                "start": {"dateTime": "2026-03-02T09:00:00-05:00", "timeZone": "America/New_York"},
                "hangoutLink": "https://meet.google.com/abc-defg-hij",
                "attendees": [{"email": "ada@example.com", "displayName": "Ada"}],
                "extendedProperties": {"private": {"bookingName": "Ada Lovelace"}}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = calendar(&server)
        .search_events(&EventSearch {
            calendar_id: "primary".to_string(),
            text: "DISC-1-ABC".to_string(),
            time_min: at(0, 0),
            time_max: at(23, 0),
        })
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.start, Some(at(14, 0)));
    assert_eq!(
        event.meeting_link.as_deref(),
        Some("https://meet.google.com/abc-defg-hij")
    );
    assert_eq!(event.attendees[0].display_name.as_deref(), Some("Ada"));
    assert_eq!(event.private_properties["bookingName"], "Ada Lovelace");
    assert!(event.mentions("DISC-1-ABC"));
}

#[tokio::test]
async fn malformed_body_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = calendar(&server)
        .search_events(&EventSearch {
            calendar_id: "primary".to_string(),
            text: "DISC".to_string(),
            time_min: at(0, 0),
            time_max: at(23, 0),
        })
        .await;

    assert!(matches!(result, Err(SchedulerError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn missing_credentials_fail_without_calling_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = GoogleCalendarConfig {
        api_base: server.uri(),
        token_uri: format!("{}/token", server.uri()),
        credentials: None,
        access_token: None,
        http_timeout: Duration::from_secs(5),
    };
    let calendar = GoogleCalendar::new(&config).unwrap();

    let result = calendar.create_event(&new_event()).await;
    assert!(matches!(result, Err(SchedulerError::UpstreamUnavailable(_))));
}
