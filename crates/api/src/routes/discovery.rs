use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/discovery/day-availability",
            get(handlers::availability::day_availability),
        )
        .route("/api/discovery/earliest", get(handlers::availability::earliest))
        .route("/api/discovery/book", post(handlers::booking::book))
        .route("/api/discovery/lookup", get(handlers::booking::lookup))
}
