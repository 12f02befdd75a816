//! Error handling utilities for route handlers

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Request-level error taxonomy. Every variant serializes as a JSON body
/// of the form `{"error": <message>}` with the matching status code.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// Client-correctable input problem (400)
    Validation(&'static str),
    /// Shared-secret mismatch (401)
    Unauthorized,
    /// Mail relay or storage failure (500). Carries only the generic
    /// public message; detail is logged server-side before construction.
    Upstream(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Validation(msg) | ApiError::Upstream(msg) => msg,
            ApiError::Unauthorized => "Unauthorized",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Extension trait for logging error detail and converting to `ApiError`
pub trait LogErr<T> {
    /// Log the underlying error with context and return an upstream error
    /// carrying only the given public message
    fn log_upstream(self, context: &str, public: &'static str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_upstream(self, context: &str, public: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            eprintln!("{}: {}", context, e);
            ApiError::Upstream(public)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("Missing required fields").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Upstream("Failed to send email").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_keeps_public_message_only() {
        let result: Result<(), &str> = Err("connection refused by 10.0.0.1:587");
        let err = result
            .log_upstream("[test] send failed", "Failed to send email")
            .unwrap_err();
        assert_eq!(err, ApiError::Upstream("Failed to send email"));
        assert_eq!(err.message(), "Failed to send email");
    }
}
