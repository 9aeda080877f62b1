use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotsync_api::{
    ApiState,
    config::{ApiConfig, CalendarBackendKind, load_scheduler_config},
};
use slotsync_calendar::{GoogleCalendar, GoogleCalendarConfig, InMemoryCalendar};
use slotsync_core::calendar::CalendarBackend;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    slotsync_api::init_tracing(config.log_level)?;
    let scheduler = load_scheduler_config()?;

    let calendar: Arc<dyn CalendarBackend> = match config.calendar_backend {
        CalendarBackendKind::Google => {
            let google = GoogleCalendarConfig::from_env()?;
            info!(
                booking_calendar = %scheduler.booking_calendar_id,
                has_credentials = google.has_credentials(),
                "connecting to Google Calendar"
            );
            Arc::new(GoogleCalendar::new(&google)?)
        }
        CalendarBackendKind::Memory => {
            warn!("using the in-memory calendar; bookings are lost on restart");
            Arc::new(InMemoryCalendar::new())
        }
    };

    info!(
        backend = ?config.calendar_backend,
        time_zone = %scheduler.time_zone,
        calendars = ?scheduler.calendar_ids,
        "scheduler configured"
    );

    // Start API server
    let state = Arc::new(ApiState { calendar, scheduler });
    slotsync_api::start_server(config, state).await?;

    Ok(())
}
