//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps crosswalk service errors to HTTP status codes and returns JSON
//! bodies carrying an error code, message, and optional details. Internal
//! error details never reach the client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xwalk_service::CrosswalkError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body or query could not be parsed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request parsed but violates a curation rule (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Dependency not reachable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CrosswalkError> for AppError {
    fn from(err: CrosswalkError) -> Self {
        match err {
            CrosswalkError::NotFound(msg) => Self::NotFound(msg),
            CrosswalkError::BadRequest(msg) => Self::BadRequest(msg),
            CrosswalkError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

/// Unwrap a JSON body, mapping deserialization failures to 422.
pub fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use xwalk_store::StoreError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::NotFound("framework x".to_string()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn bad_request_is_unprocessable() {
        let (status, code) = AppError::BadRequest("same framework".to_string()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn crosswalk_errors_map_by_class() {
        assert!(matches!(
            AppError::from(CrosswalkError::NotFound("x".to_string())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(CrosswalkError::BadRequest("x".to_string())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(CrosswalkError::Store(StoreError::Integrity("x".to_string()))),
            AppError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn internal_error_hides_message() {
        let response = AppError::Internal("connection refused at 10.0.0.3".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal error occurred");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn not_found_body_carries_message() {
        let response = AppError::NotFound("framework sox".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "not found: framework sox");
    }
}
