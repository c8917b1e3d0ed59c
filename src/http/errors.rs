//! # HTTP API Errors
//!
//! Maps service outcomes onto status codes and JSON bodies.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::schema::SchemaError;
use crate::service::ServiceError;
use crate::store::StoreError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Path identifier is not a valid UUID
    #[error("Invalid identifier '{0}'")]
    InvalidId(String),

    /// Body is not valid JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Payload failed schema validation
    #[error(transparent)]
    Validation(#[from] SchemaError),

    /// Identifier resolves to no record
    #[error("{0}")]
    NotFound(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store failure, surfaced as-is
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::InvalidBody(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidId(_) => "INVALID_ID",
            ApiError::InvalidBody(_) => "INVALID_BODY",
            ApiError::Validation(err) => err.code(),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Store(err) => err.code(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ApiError::NotFound(message),
            ServiceError::Validation(err) => ApiError::Validation(err),
            ServiceError::Store(err) => ApiError::Store(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Validation failure location
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldError>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::Validation(schema_err) => Some(FieldError {
                field: schema_err.details.field.clone(),
                expected: schema_err.details.expected.clone(),
                actual: schema_err.details.actual.clone(),
            }),
            _ => None,
        };
        Self {
            message: err.to_string(),
            code: err.code(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(event = "REQUEST_FAILED", code = self.code(), error = %self);
        } else {
            tracing::debug!(event = "REQUEST_REJECTED", code = self.code(), error = %self);
        }
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationDetails;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidId("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Store(StoreError::Unavailable("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_propagation() {
        let api: ApiError = ServiceError::not_found("No student with that ID").into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api.to_string(), "No student with that ID");

        let api: ApiError = ServiceError::Validation(SchemaError::validation_failed(
            "student",
            ValidationDetails::missing_field("first"),
        ))
        .into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api.code(), "SCHEMA_VALIDATION_FAILED");
    }

    #[test]
    fn test_validation_body_carries_details() {
        let api = ApiError::Validation(SchemaError::validation_failed(
            "assignment",
            ValidationDetails::type_mismatch("score", "number", "string"),
        ));
        let body = serde_json::to_value(ErrorResponse::from(&api)).unwrap();
        assert_eq!(body["details"]["field"], "score");
        assert_eq!(body["code"], "SCHEMA_VALIDATION_FAILED");
    }

    #[test]
    fn test_store_error_body_is_raw_error() {
        let api = ApiError::Store(StoreError::Unavailable("connection refused".into()));
        let body = serde_json::to_value(ErrorResponse::from(&api)).unwrap();
        assert_eq!(body["message"], "Store unavailable: connection refused");
        assert_eq!(body["code"], "STORE_UNAVAILABLE");
        assert!(body.get("details").is_none());
    }
}
