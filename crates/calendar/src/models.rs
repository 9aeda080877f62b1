//! Google Calendar v3 wire shapes used by the adapter.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFreeBusyRequest {
    pub time_min: String,
    pub time_max: String,
    pub time_zone: String,
    pub items: Vec<GoogleCalendarItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleCalendarItem {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleFreeBusyResponse {
    #[serde(default)]
    pub calendars: BTreeMap<String, GoogleFreeBusyCalendar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleFreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<GoogleBusyPeriod>,
    #[serde(default)]
    pub errors: Vec<GoogleCalendarError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleBusyPeriod {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleCalendarError {
    pub domain: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventInsert {
    pub summary: String,
    pub description: String,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
    pub attendees: Vec<GoogleAttendee>,
    pub conference_data: GoogleConferenceData,
    pub reminders: GoogleReminders,
    pub extended_properties: GoogleExtendedProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAttendee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConferenceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_request: Option<GoogleCreateConferenceRequest>,
    #[serde(default, skip_serializing)]
    pub entry_points: Vec<GoogleEntryPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCreateConferenceRequest {
    pub request_id: String,
    pub conference_solution_key: GoogleConferenceSolutionKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEntryPoint {
    pub entry_point_type: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleReminders {
    pub use_default: bool,
    pub overrides: Vec<GoogleReminderOverride>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
}

/// Event as returned by insert and list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<GoogleEventTime>,
    pub hangout_link: Option<String>,
    pub conference_data: Option<GoogleConferenceData>,
    #[serde(default)]
    pub attendees: Vec<GoogleAttendee>,
    pub extended_properties: Option<GoogleExtendedProperties>,
}

impl GoogleEvent {
    /// Video entry point first, then any entry point, then the legacy
    /// hangout link.
    pub fn meeting_link(&self) -> Option<String> {
        let entry_points = self
            .conference_data
            .as_ref()
            .map(|data| data.entry_points.as_slice())
            .unwrap_or_default();

        entry_points
            .iter()
            .find(|p| p.entry_point_type.as_deref() == Some("video"))
            .or_else(|| entry_points.first())
            .and_then(|p| p.uri.clone())
            .or_else(|| self.hangout_link.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn meeting_link_prefers_video_entry_point() {
        let event: GoogleEvent = serde_json::from_str(
            r#"{
                "id": "evt",
                "hangoutLink": "https://meet.google.com/legacy",
                "conferenceData": {"entryPoints": [
                    {"entryPointType": "phone", "uri": "tel:+1-555-0100"},
                    {"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij"}
                ]}
            }"#,
        )
        .unwrap();
        assert_eq!(
            event.meeting_link().as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
    }

    #[test]
    fn meeting_link_falls_back_to_hangout_link() {
        let body = r#"{"id": "evt", "hangoutLink": "https://meet.google.com/legacy"}"#;
        let event: GoogleEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.meeting_link().as_deref(), Some("https://meet.google.com/legacy"));

        let bare: GoogleEvent = serde_json::from_str(r#"{"id": "evt"}"#).unwrap();
        assert_eq!(bare.meeting_link(), None);
    }

    #[test]
    fn insert_payload_omits_response_only_fields() {
        let payload = GoogleEventInsert {
            summary: "s".to_string(),
            description: "d".to_string(),
            start: GoogleEventTime {
                date_time: Some("2026-03-02T14:00:00Z".to_string()),
                date: None,
                time_zone: Some("America/New_York".to_string()),
            },
            end: GoogleEventTime::default(),
            attendees: Vec::new(),
            conference_data: GoogleConferenceData {
                create_request: Some(GoogleCreateConferenceRequest {
                    request_id: "discovery-1".to_string(),
                    conference_solution_key: GoogleConferenceSolutionKey {
                        kind: "hangoutsMeet".to_string(),
                    },
                }),
                entry_points: Vec::new(),
            },
            reminders: GoogleReminders {
                use_default: false,
                overrides: Vec::new(),
            },
            extended_properties: GoogleExtendedProperties::default(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["start"]["dateTime"], "2026-03-02T14:00:00Z");
        assert!(json["start"].get("date").is_none());
        assert_eq!(
            json["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
        assert!(json["conferenceData"].get("entryPoints").is_none());
        assert_eq!(json["reminders"]["useDefault"], false);
    }
}
