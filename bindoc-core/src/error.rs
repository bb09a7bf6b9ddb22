use crate::bind::BindError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Every binding failure is a client error: `413` for an oversized body,
/// `400` otherwise.
impl IntoResponse for BindError {
    fn into_response(self) -> Response {
        let status = match self {
            BindError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        error_response(status, self.message())
    }
}
