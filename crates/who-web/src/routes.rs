//! Route definitions.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::AppState;

/// Path served by the scrape endpoint
pub const METRICS_PATH: &str = "/metrics";

/// Exporter routes
pub fn routes() -> Router<AppState> {
    Router::new().route(METRICS_PATH, get(handlers::metrics::get_metrics))
}
