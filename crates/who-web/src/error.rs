//! API error handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Metric encoding failed
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::Encode(prometheus::Error::Msg("bad utf-8".to_string()));
        assert!(err.to_string().contains("bad utf-8"));
    }

    #[test]
    fn errors_map_to_500() {
        let err = ApiError::Encode(prometheus::Error::Msg("boom".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
