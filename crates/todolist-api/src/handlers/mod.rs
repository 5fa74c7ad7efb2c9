pub mod health;
pub mod list;
pub mod task;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use todolist_core::FormErrors;

/// Header carrying the requesting user's id, set by the authenticating
/// proxy in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    Unauthorized,
    Invalid(FormErrors),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: what.to_string(),
                }),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "authentication required".to_string(),
                }),
            )
                .into_response(),
            ApiError::Invalid(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error }),
            )
                .into_response(),
        }
    }
}

impl From<todolist_db::Error> for ApiError {
    fn from(err: todolist_db::Error) -> Self {
        match err {
            todolist_db::Error::TaskNotFound(_) => ApiError::NotFound("Task not found"),
            todolist_db::Error::ListNotFound(_) => ApiError::NotFound("Task list not found"),
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<FormErrors> for ApiError {
    fn from(errors: FormErrors) -> Self {
        ApiError::Invalid(errors)
    }
}

/// The requesting user's id, if the proxy attached one.
pub fn requester(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_requester_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("42"));
        assert_eq!(requester(&headers), Some(42));
    }

    #[test]
    fn test_requester_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(requester(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        assert_eq!(requester(&headers), None);
    }
}
