//! Prometheus scrape handler.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::AppState;

/// Current snapshot in the text exposition format
///
/// GET /metrics
pub async fn get_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.store.render()?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
