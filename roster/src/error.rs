//! Errors surfaced to HTTP callers.

use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};
use thiserror::Error;

/// Error kinds the pipeline maps onto HTTP responses.
///
/// Method mismatches are rejected by the router itself (405), and partial
/// results are not errors at all; everything else ends up here. None of
/// these ever panic the process.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Admission rejected by the composite limiter.
    #[error("rate limit exceeded, please try again later")]
    RateLimited,
    /// Malformed body or missing required field.
    #[error("{0}")]
    BadRequest(&'static str),
    /// Response body could not be encoded.
    #[error("failed to encode response")]
    Encoding,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, "1")],
                self.to_string(),
            )
                .into_response(),
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ApiError::Encoding => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
