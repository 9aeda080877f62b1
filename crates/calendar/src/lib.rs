//! # SlotSync Calendar
//!
//! Calendar backend adapters for the scheduler core.
//!
//! - [`google::GoogleCalendar`]: Google Calendar v3 over HTTPS, authorised
//!   with a service account or a static bearer token
//! - [`memory::InMemoryCalendar`]: a process-local calendar for development
//!   and tests
//!
//! Provider payloads are parsed here and never reach the core crate.

pub mod auth;
pub mod config;
pub mod google;
pub mod memory;
pub mod models;

pub use config::GoogleCalendarConfig;
pub use google::GoogleCalendar;
pub use memory::InMemoryCalendar;
