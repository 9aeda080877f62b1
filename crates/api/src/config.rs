//! # API Configuration Module
//!
//! Loads server and scheduler settings from environment variables, with
//! defaults where appropriate.
//!
//! ## Server
//!
//! - `API_HOST`: host address to bind to (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `CALENDAR_BACKEND`: `google` or `memory` (default: "google")
//!
//! ## Scheduler
//!
//! - `SCHEDULER_START_HOUR` / `SCHEDULER_END_HOUR`: business hours (9 / 17)
//! - `SCHEDULER_SLOT_MINUTES`: slot grid in minutes (15)
//! - `SCHEDULER_LEAD_TIME_HOURS`: minimum notice before a slot (24)
//! - `SCHEDULER_HORIZON_DAYS`: earliest-slot search horizon (30)
//! - `SCHEDULER_BOOKING_MINUTES`: booked meeting length (30)
//! - `SCHEDULER_LOOKUP_WINDOW_DAYS`: booking lookup window each side (14)
//! - `SCHEDULER_BOOKING_PREFIX`: booking id prefix ("DISC")
//! - `SCHEDULER_RECHECK_BEFORE_BOOKING`: re-query free/busy before booking (false)
//! - `GOOGLE_CALENDAR_TIME_ZONE`: IANA zone ("America/New_York")
//! - `GOOGLE_CALENDAR_ID`: booking calendar ("primary")
//! - `GOOGLE_CALENDAR_IDS`: comma-separated free/busy calendars (defaults to
//!   the booking calendar)

use chrono::Duration;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, bail, eyre};
use slotsync_core::models::config::{BusinessHours, SchedulerConfig};
use std::{env, str::FromStr};
use tracing::Level;

/// Which calendar implementation the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarBackendKind {
    Google,
    Memory,
}

impl FromStr for CalendarBackendKind {
    type Err = eyre::Report;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "memory" => Ok(Self::Memory),
            other => bail!(
                "Unknown CALENDAR_BACKEND '{}': expected 'google' or 'memory'",
                other
            ),
        }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    pub port: u16,

    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub calendar_backend: CalendarBackendKind,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `API_PORT` is not a valid port or
    /// `CALENDAR_BACKEND` names an unknown backend.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Network settings
        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Logging settings
        let log_level = match var("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = var("API_CORS_ORIGINS").map(|origins| split_list(&origins));
        if cors_origins.iter().flatten().any(|origin| origin == "*") {
            bail!("API_CORS_ORIGINS must list explicit origins, not '*'");
        }

        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let calendar_backend = var("CALENDAR_BACKEND")
            .map(|v| v.parse::<CalendarBackendKind>())
            .transpose()?
            .unwrap_or(CalendarBackendKind::Google);

        Ok(Self {
            host,
            port,
            log_level,
            cors_origins,
            request_timeout,
            calendar_backend,
        })
    }

    /// Returns the server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads and validates the scheduler settings from the environment.
pub fn load_scheduler_config() -> Result<SchedulerConfig> {
    scheduler_config_from_vars(|key| env::var(key).ok())
}

pub fn scheduler_config_from_vars(
    var: impl Fn(&str) -> Option<String>,
) -> Result<SchedulerConfig> {
    let defaults = SchedulerConfig::default();
    let hours = BusinessHours::default();

    let number = |key: &str, default: i64| -> Result<i64> {
        match var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse()
                .wrap_err_with(|| format!("Invalid {key} value '{value}'")),
            None => Ok(default),
        }
    };
    let span = |key: &str, default: i64, unit: fn(i64) -> Option<Duration>| -> Result<Duration> {
        let value = number(key, default)?;
        unit(value).ok_or_else(|| eyre!("Invalid {key} value '{value}'"))
    };
    let hour = |key: &str, default: u32| -> Result<u32> {
        u32::try_from(number(key, i64::from(default))?)
            .wrap_err_with(|| format!("{key} must not be negative"))
    };

    let business_hours = BusinessHours {
        start_hour: hour("SCHEDULER_START_HOUR", hours.start_hour)?,
        end_hour: hour("SCHEDULER_END_HOUR", hours.end_hour)?,
        slot_minutes: hour("SCHEDULER_SLOT_MINUTES", hours.slot_minutes)?,
    };

    let time_zone = match var("GOOGLE_CALENDAR_TIME_ZONE").filter(|v| !v.trim().is_empty()) {
        Some(name) => name
            .trim()
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid GOOGLE_CALENDAR_TIME_ZONE '{}': {}", name, e))?,
        None => defaults.time_zone,
    };

    let booking_calendar_id = var("GOOGLE_CALENDAR_ID")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(defaults.booking_calendar_id);

    let calendar_ids = var("GOOGLE_CALENDAR_IDS")
        .map(|v| split_list(&v))
        .filter(|ids| !ids.is_empty())
        .unwrap_or_else(|| vec![booking_calendar_id.clone()]);

    let recheck_before_booking = match var("SCHEDULER_RECHECK_BEFORE_BOOKING") {
        Some(value) => parse_flag(&value)
            .ok_or_else(|| {
                eyre!("Invalid SCHEDULER_RECHECK_BEFORE_BOOKING value '{}'", value)
            })?,
        None => defaults.recheck_before_booking,
    };

    let config = SchedulerConfig {
        business_hours,
        lead_time: span(
            "SCHEDULER_LEAD_TIME_HOURS",
            defaults.lead_time.num_hours(),
            Duration::try_hours,
        )?,
        horizon: span(
            "SCHEDULER_HORIZON_DAYS",
            defaults.horizon.num_days(),
            Duration::try_days,
        )?,
        booking_duration: span(
            "SCHEDULER_BOOKING_MINUTES",
            defaults.booking_duration.num_minutes(),
            Duration::try_minutes,
        )?,
        lookup_window: span(
            "SCHEDULER_LOOKUP_WINDOW_DAYS",
            defaults.lookup_window.num_days(),
            Duration::try_days,
        )?,
        time_zone,
        calendar_ids,
        booking_calendar_id,
        booking_id_prefix: var("SCHEDULER_BOOKING_PREFIX")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.booking_id_prefix),
        recheck_before_booking,
    };

    config.validate().wrap_err("Invalid scheduler configuration")?;
    Ok(config)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
