use serde::{Deserialize, Serialize};
use std::fmt;

/// Incoming booking payload as sent by clients.
///
/// Older clients send `phone`, `selectedDate` and `selectedTime`; those names
/// are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "phone")]
    pub contact: Option<String>,

    /// Local date, `YYYY-MM-DD` (legacy shape)
    #[serde(default, alias = "selectedDate")]
    pub date: Option<String>,

    /// Local 12-hour time, `h:mm AM` (legacy shape)
    #[serde(default, alias = "selectedTime")]
    pub time: Option<String>,

    #[serde(default)]
    pub start_iso: Option<String>,

    #[serde(default)]
    pub end_iso: Option<String>,

    #[serde(flatten)]
    pub project: ProjectDetails,
}

/// Free-text project fields echoed into the event description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(default)]
    pub project_details: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub key_features: Option<String>,
    #[serde(default)]
    pub inspiration: Option<String>,
    #[serde(default)]
    pub business_goals: Option<String>,
}

/// The two ways a client can name a meeting time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingTime {
    Explicit {
        start_iso: String,
        end_iso: Option<String>,
    },
    Legacy {
        date: String,
        time: String,
    },
}

/// Opaque, client-facing booking reference: `PREFIX-<millis>-<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub success: bool,
    pub booking_id: BookingId,
    pub event_id: String,
    pub meeting_link: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLookupResponse {
    pub booking_id: BookingId,
    pub name: String,
    pub contact: String,
    /// e.g. "Monday, March 2, 2026"
    pub date: String,
    /// e.g. "9:00 AM"
    pub time: String,
    pub meeting_link: String,
}
