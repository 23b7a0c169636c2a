use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::PlannerError;

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        details: Option<Value>,
    },
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::ValidationError { .. } => "ValidationError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        tracing::debug!(error = %self, "Client error");
        let message = self.to_string();

        let details = match self {
            ApiError::ValidationError { details, .. } => details,
            _ => None,
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(error_response)).into_response()
    }
}

// Conversion from common error types

impl From<PlannerError> for ApiError {
    fn from(error: PlannerError) -> Self {
        match &error {
            PlannerError::Validation { field, .. } => ApiError::ValidationError {
                details: Some(json!({ "field": field })),
                message: error.to_string(),
            },
            PlannerError::NotFound { .. } => ApiError::NotFound(error.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError {
            message: errors.to_string(),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}
