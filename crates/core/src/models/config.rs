use chrono::Duration;
use chrono_tz::Tz;
use eyre::{Result, ensure};

/// Daily window in which meetings may start, and the slot grid inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    /// First bookable hour (inclusive, local time)
    pub start_hour: u32,
    /// Last bookable hour (exclusive, local time)
    pub end_hour: u32,
    /// Grid step and slot length in minutes
    pub slot_minutes: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            slot_minutes: 15,
        }
    }
}

impl BusinessHours {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.start_hour < self.end_hour && self.end_hour <= 24,
            "business hours must satisfy 0 <= start < end <= 24 (got {}..{})",
            self.start_hour,
            self.end_hour
        );
        ensure!(
            self.slot_minutes > 0 && 60 % self.slot_minutes == 0,
            "slot minutes must divide 60 evenly (got {})",
            self.slot_minutes
        );
        Ok(())
    }

    pub fn slot_length(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }
}

/// Upper bound for every configured span, keeping date arithmetic in range.
pub const MAX_SPAN_DAYS: i64 = 5 * 365;

/// Process-wide scheduler settings.
///
/// Built once at startup and shared read-only with every request.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub business_hours: BusinessHours,
    /// Minimum distance between "now" and the first bookable slot start
    pub lead_time: Duration,
    /// How far past `now + lead_time` the earliest-slot search looks
    pub horizon: Duration,
    /// Meeting length for bookings made with the legacy date/time pair
    pub booking_duration: Duration,
    /// Half-width of the window searched by booking lookup
    pub lookup_window: Duration,
    pub time_zone: Tz,
    /// Calendars whose busy blocks make a slot unavailable
    pub calendar_ids: Vec<String>,
    /// Calendar that receives new booking events
    pub booking_calendar_id: String,
    pub booking_id_prefix: String,
    /// Query free/busy again right before creating the event
    pub recheck_before_booking: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            business_hours: BusinessHours::default(),
            lead_time: Duration::hours(24),
            horizon: Duration::days(30),
            booking_duration: Duration::minutes(30),
            lookup_window: Duration::days(14),
            time_zone: chrono_tz::America::New_York,
            calendar_ids: vec!["primary".to_string()],
            booking_calendar_id: "primary".to_string(),
            booking_id_prefix: "DISC".to_string(),
            recheck_before_booking: false,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        self.business_hours.validate()?;
        let max_span = Duration::days(MAX_SPAN_DAYS);
        ensure!(self.lead_time >= Duration::zero(), "lead time must not be negative");
        ensure!(self.horizon > Duration::zero(), "search horizon must be positive");
        ensure!(
            self.booking_duration > Duration::zero(),
            "booking duration must be positive"
        );
        ensure!(
            self.lookup_window >= Duration::zero(),
            "lookup window must not be negative"
        );
        for (name, span) in [
            ("lead time", self.lead_time),
            ("search horizon", self.horizon),
            ("booking duration", self.booking_duration),
            ("lookup window", self.lookup_window),
        ] {
            ensure!(span <= max_span, "{name} must not exceed {MAX_SPAN_DAYS} days");
        }
        ensure!(!self.calendar_ids.is_empty(), "at least one calendar id is required");
        ensure!(
            !self.booking_calendar_id.trim().is_empty(),
            "booking calendar id must not be empty"
        );
        ensure!(
            !self.booking_id_prefix.trim().is_empty(),
            "booking id prefix must not be empty"
        );
        Ok(())
    }

    /// Horizon rounded down to whole days, for user-facing messages.
    pub fn horizon_days(&self) -> i64 {
        self.horizon.num_days()
    }
}
