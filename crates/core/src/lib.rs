//! # SlotSync Core
//!
//! Domain types and algorithms for the calendar-backed meeting scheduler.
//!
//! - **models**: interval, slot, booking and configuration values
//! - **calendar**: the narrow backend trait adapters implement
//! - **scheduling**: busy aggregation, day slot generation and earliest-slot search
//! - **booking**: booking orchestration and best-effort lookup
//!
//! Nothing in this crate reads the environment; every operation takes an
//! explicit [`models::config::SchedulerConfig`] and an explicit "now".

pub mod booking;
pub mod calendar;
pub mod errors;
pub mod models;
pub mod scheduling;
