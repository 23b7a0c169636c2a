use axum::{extract::rejection::JsonRejection, extract::FromRequest};
use serde_json::json;

use crate::api::error::ApiError;

/// `Json` extractor whose rejections render as [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::ValidationError {
                details: rejected_field(&message).map(|field| json!({ "field": field })),
                message,
            },
            _ => ApiError::BadRequest(message),
        }
    }
}

/// Field named by a body deserialization error, if any
fn rejected_field(message: &str) -> Option<String> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, detail)| detail);

    if let Some(rest) = detail.strip_prefix("missing field `") {
        return rest.split('`').next().map(str::to_owned);
    }

    let (path, _) = detail.split_once(": ")?;
    (!path.is_empty() && !path.contains(char::is_whitespace)).then(|| path.to_owned())
}
