use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use weekboard_core::error::CoreError;

/// Error body `{ "error": "..." }` with the matching status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, message) = match err {
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CoreError::InvalidDate(_) | CoreError::AmbiguousId(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            CoreError::ReadOnly(msg) => (StatusCode::CONFLICT, msg),
            CoreError::Database(_) | CoreError::Migration(_) | CoreError::Io(_) => {
                tracing::error!(error = ?err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
