use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data
    pub data: T,
    /// Response timestamp
    pub timestamp: DateTime<Utc>,
    /// Request metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Additional metadata about the response
#[derive(Debug, Default, Serialize)]
pub struct ResponseMetadata {
    /// Number of items in a listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    /// Processing duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Add total count to metadata
    pub fn with_count(mut self, count: usize) -> Self {
        let metadata = self.metadata.take().unwrap_or_default();
        self.metadata = Some(ResponseMetadata {
            total_count: Some(count),
            ..metadata
        });
        self
    }

    /// Add processing duration to metadata
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        let metadata = self.metadata.take().unwrap_or_default();
        self.metadata = Some(ResponseMetadata {
            duration_ms: Some(duration_ms),
            ..metadata
        });
        self
    }

    /// Respond with 201 Created
    pub fn created(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Helper to create a success response
pub fn success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

/// Helper to create a listing response carrying its item count
pub fn listing<T: Serialize>(items: Vec<T>) -> ApiResponse<Vec<T>> {
    let count = items.len();
    ApiResponse::success(items).with_count(count)
}
