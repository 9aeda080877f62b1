
use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use slotsync_api::{ApiState, build_router, middleware::error_handling::map_error};
use slotsync_core::{
    calendar::MockCalendarBackend,
    errors::SchedulerError,
    models::config::SchedulerConfig,
};
use tower::ServiceExt;

use test_utils::{api_config, future_date, local, server_with};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[rstest]
#[case(SchedulerError::invalid("bad date"), StatusCode::BAD_REQUEST)]
#[case(SchedulerError::NotFound("Booking not found".into()), StatusCode::NOT_FOUND)]
#[case(SchedulerError::SlotTaken("taken".into()), StatusCode::CONFLICT)]
#[case(SchedulerError::EventCreationFailed("rejected".into()), StatusCode::BAD_GATEWAY)]
#[case(SchedulerError::upstream("timeout"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(SchedulerError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
fn error_kinds_map_to_statuses(#[case] error: SchedulerError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[tokio::test]
async fn client_errors_echo_their_message() {
    let body = body_json(map_error(SchedulerError::invalid("Invalid date"))).await;
    assert_eq!(body, json!({ "error": "Invalid date" }));
}

#[tokio::test]
async fn event_creation_failure_carries_details() {
    let body = body_json(map_error(SchedulerError::EventCreationFailed(
        "Google Calendar rejected the event (400): Invalid attendee email.".into(),
    )))
    .await;

    assert_eq!(body["error"], "Failed to book discovery call");
    assert_eq!(
        body["details"],
        "Google Calendar rejected the event (400): Invalid attendee email."
    );
}

#[tokio::test]
async fn upstream_detail_is_not_leaked() {
    let body = body_json(map_error(SchedulerError::upstream(
        "token endpoint returned 401 for svc@project.iam.gserviceaccount.com",
    )))
    .await;

    assert_eq!(body, json!({ "error": "Calendar service temporarily unavailable" }));
}

#[test_log::test(tokio::test)]
async fn free_busy_outage_is_503() {
    let mut calendar = MockCalendarBackend::new();
    calendar
        .expect_query_free_busy()
        .times(1)
        .returning(|_| Err(SchedulerError::upstream("connection reset")));

    let server = server_with(Arc::new(calendar), SchedulerConfig::default());
    let response = server
        .get("/api/discovery/day-availability")
        .add_query_param("date", future_date().to_string())
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["error"],
        "Calendar service temporarily unavailable"
    );
}

#[tokio::test]
async fn fully_booked_horizon_is_404() {
    let mut calendar = MockCalendarBackend::new();
    calendar.expect_query_free_busy().returning(|query| {
        let block = slotsync_core::calendar::BusyBlock::new(
            query.time_min.to_rfc3339(),
            query.time_max.to_rfc3339(),
        );
        Ok(query
            .calendar_ids
            .iter()
            .map(|id| (id.clone(), vec![block.clone()]))
            .collect())
    });

    let server = server_with(Arc::new(calendar), SchedulerConfig::default());
    let response = server.get("/api/discovery/earliest").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"],
        "No available slots in the next 30 days"
    );
}

#[tokio::test]
async fn rejected_event_is_502_with_details() {
    let mut calendar = MockCalendarBackend::new();
    calendar
        .expect_create_event()
        .returning(|_| Err(SchedulerError::EventCreationFailed("Invalid conference type".into())));

    let server = server_with(Arc::new(calendar), SchedulerConfig::default());
    let response = server
        .post("/api/discovery/book")
        .json(&json!({
            "name": "Ada Lovelace",
            "contact": "555-0100",
            "startIso": local(future_date(), 14, 0).to_rfc3339()
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Failed to book discovery call");
    assert_eq!(body["details"], "Invalid conference type");
}

#[tokio::test]
async fn recheck_conflict_is_409() {
    let date = future_date();
    let mut calendar = MockCalendarBackend::new();
    calendar.expect_query_free_busy().returning(move |query| {
        let block = slotsync_core::calendar::BusyBlock::new(
            local(date, 14, 0).to_rfc3339(),
            local(date, 15, 0).to_rfc3339(),
        );
        Ok(query
            .calendar_ids
            .iter()
            .map(|id| (id.clone(), vec![block.clone()]))
            .collect())
    });
    calendar.expect_create_event().never();

    let scheduler = SchedulerConfig {
        recheck_before_booking: true,
        ..SchedulerConfig::default()
    };
    let server = server_with(Arc::new(calendar), scheduler);
    let response = server
        .post("/api/discovery/book")
        .json(&json!({
            "name": "Ada Lovelace",
            "contact": "555-0100",
            "startIso": local(date, 14, 0).to_rfc3339()
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn lookup_outage_is_503_through_the_raw_router() {
    let mut calendar = MockCalendarBackend::new();
    calendar
        .expect_search_events()
        .returning(|_| Err(SchedulerError::upstream("dns failure")));

    let state = Arc::new(ApiState {
        calendar: Arc::new(calendar),
        scheduler: SchedulerConfig::default(),
    });
    let response = build_router(state, &api_config())
        .oneshot(
            Request::builder()
                .uri("/api/discovery/lookup?bookingId=DISC-1-ABC")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
