use std::collections::HashMap;

use crate::{
    calendar::{EventReminder, NewEvent, ReminderMethod},
    models::{
        booking::{BookingId, ProjectDetails},
        config::SchedulerConfig,
        interval::TimeInterval,
    },
};

/// Private event property holding the booking reference.
pub const BOOKING_ID_PROPERTY: &str = "bookingId";
/// Private event property holding the requester's name.
pub const NAME_PROPERTY: &str = "bookingName";
/// Private event property holding the requester's contact.
pub const CONTACT_PROPERTY: &str = "bookingContact";

const AGENDA: &[&str] = &[
    "Discuss project requirements and goals",
    "Review technical specifications and features",
    "Understand target audience and user needs",
    "Determine project scope and development approach",
    "Review timeline and budget considerations",
    "Provide initial recommendations and next steps",
    "Q&A session",
];

const PREPARATION: &[&str] = &[
    "Client has provided comprehensive project details above",
    "Review similar projects in our portfolio",
    "Prepare technical questions based on project type",
    "Have cost estimation framework ready",
    "Prepare timeline discussion based on client needs",
];

/// Everything needed to describe one discovery call on the calendar.
pub struct EventDraft<'a> {
    pub booking_id: &'a BookingId,
    pub name: &'a str,
    pub contact: &'a str,
    pub slot: TimeInterval,
    pub project: &'a ProjectDetails,
    pub conference_request_id: String,
}

/// Builds the calendar payload for a booking.
pub fn build_event(config: &SchedulerConfig, draft: EventDraft<'_>) -> NewEvent {
    let private_properties = HashMap::from([
        (BOOKING_ID_PROPERTY.to_string(), draft.booking_id.to_string()),
        (NAME_PROPERTY.to_string(), draft.name.to_string()),
        (CONTACT_PROPERTY.to_string(), draft.contact.to_string()),
    ]);

    NewEvent {
        calendar_id: config.booking_calendar_id.clone(),
        summary: format!("Discovery Call - {}", draft.name),
        description: describe(&draft),
        start: draft.slot.start(),
        end: draft.slot.end(),
        time_zone: config.time_zone,
        attendees: Vec::new(),
        conference_request_id: draft.conference_request_id,
        reminders: vec![
            EventReminder {
                method: ReminderMethod::Email,
                minutes_before: 24 * 60,
            },
            EventReminder {
                method: ReminderMethod::Email,
                minutes_before: 60,
            },
            EventReminder {
                method: ReminderMethod::Popup,
                minutes_before: 10,
            },
        ],
        private_properties,
    }
}

fn describe(draft: &EventDraft<'_>) -> String {
    let project = draft.project;
    let or_unspecified =
        |value: &Option<String>| non_blank(value).unwrap_or("Not specified").to_string();

    let mut sections = vec![
        format!("Discovery Call with {}", draft.name),
        format!("Booking Reference: {}", draft.booking_id),
        format!("Contact Information:\n- Contact: {}", draft.contact),
        format!(
            "PROJECT OVERVIEW:\n{}",
            non_blank(&project.project_details).unwrap_or("No specific details provided")
        ),
        format!(
            "PROJECT DETAILS:\n- Project Type: {}\n- Budget Range: {}\n\
             - Timeline: {}\n- Target Audience: {}",
            or_unspecified(&project.project_type),
            or_unspecified(&project.budget),
            or_unspecified(&project.timeline),
            or_unspecified(&project.target_audience),
        ),
        format!("KEY FEATURES NEEDED:\n{}", or_unspecified(&project.key_features)),
        format!("INSPIRATION/REFERENCES:\n{}", or_unspecified(&project.inspiration)),
        format!("BUSINESS GOALS:\n{}", or_unspecified(&project.business_goals)),
    ];
    sections.push(bulleted("MEETING AGENDA:", AGENDA));
    sections.push(bulleted("PREPARATION NOTES:", PREPARATION));
    sections.push(
        "Please review all project details above before the call and prepare relevant \
         questions and recommendations."
            .to_string(),
    );

    sections.join("\n\n")
}

fn bulleted(heading: &str, items: &[&str]) -> String {
    let lines: Vec<String> = items.iter().map(|item| format!("- {item}")).collect();
    format!("{heading}\n{}", lines.join("\n"))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
