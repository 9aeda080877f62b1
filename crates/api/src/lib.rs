//! # SlotSync API
//!
//! The HTTP surface of the discovery-call scheduler.
//!
//! ## Architecture
//!
//! - **Routes**: endpoint paths under `/api/discovery` plus health checks
//! - **Handlers**: parse requests, call into `slotsync-core`, shape responses
//! - **Middleware**: scheduler error to HTTP response mapping
//! - **Config**: server and scheduler settings from the environment
//!
//! Availability and booking logic lives in the core crate; the calendar
//! backend is injected through [`ApiState`].

/// Server and scheduler configuration
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling
pub mod middleware;
/// Route definitions
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::Result;
use slotsync_core::{calendar::CalendarBackend, models::config::SchedulerConfig};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

/// Shared application state that is accessible to all request handlers.
///
/// ```rust,ignore
/// let state = Arc::new(ApiState {
///     calendar: Arc::new(InMemoryCalendar::new()),
///     scheduler: SchedulerConfig::default(),
/// });
/// let app = build_router(state, &api_config);
/// ```
pub struct ApiState {
    /// Calendar the scheduler reads free/busy data from and books into
    pub calendar: Arc<dyn CalendarBackend>,
    /// Immutable scheduler settings, loaded once at startup
    pub scheduler: SchedulerConfig,
}

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` directives take precedence over `level`.
pub fn init_tracing(level: Level) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the application router with every route and layer attached.
pub fn build_router(state: Arc<ApiState>, config: &config::ApiConfig) -> Router {
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability and booking endpoints
        .merge(routes::discovery::routes())
        .with_state(state);

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    app.layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            // A wildcard cannot be combined with credentials.
            Ok(value) if value == "*" => {
                warn!("ignoring wildcard CORS origin");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Binds the configured address and serves until the process stops.
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state, &config);

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
