use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The movie catalog could not be reached or answered with garbage
    #[error("Catalog service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Too many requests, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::UpstreamUnavailable(detail) => {
                tracing::error!(error = %detail, "Catalog service failure");
                let body = Json(json!({
                    "error": "Failed to generate recommendations",
                    "message": "Failed to fetch movies from the catalog service",
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            AppError::RateLimited { retry_after } => {
                // Round up so clients never retry before the slot is free
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                let body = Json(json!({
                    "error": "Too many requests from this address, please try again later.",
                    "message": format!("Retry after {} seconds", secs),
                    "retryAfter": secs,
                }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Internal error");
                let body = Json(json!({
                    "error": "Internal server error",
                    "message": self.to_string(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures talking to the text generation service.
///
/// These never reach the HTTP caller: the ranker recovers from every variant
/// by switching to the fallback ranking.
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response too large: {0} bytes")]
    ResponseTooLarge(usize),

    #[error("undecodable completion envelope: {0}")]
    InvalidResponse(String),

    #[error("generation service returned no content")]
    EmptyResponse,

    #[error("configuration error: {0}")]
    Config(String),
}
