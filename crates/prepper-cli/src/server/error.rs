//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prepper::PrepError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from client.
    BadRequest(String),
    /// Another mutating operation is in flight.
    Busy,
    /// Internal server error.
    Internal(String),
    /// Error from the prepper library.
    Prep(PrepError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Busy => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Prep(e) => match e {
                PrepError::InvalidRequest(_)
                | PrepError::SessionCreation { .. }
                | PrepError::EmptyData(_)
                | PrepError::Csv(_) => StatusCode::BAD_REQUEST,
                PrepError::Transformation(_) | PrepError::UnmappableRecommendation(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PrepError::NothingToUndo(_) => StatusCode::CONFLICT,
                PrepError::ShapeMismatch { .. } | PrepError::Backend(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Busy => "busy",
            ApiError::Internal(_) => "internal",
            ApiError::Prep(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code().to_string();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
            ApiError::Busy => "Another operation is in progress".to_string(),
            ApiError::Prep(e) => e.to_string(),
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

impl From<PrepError> for ApiError {
    fn from(err: PrepError) -> Self {
        ApiError::Prep(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Busy => write!(f, "Busy: another operation is in progress"),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Prep(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::Prep(PrepError::InvalidRequest("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Prep(PrepError::Transformation("x".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Prep(PrepError::NothingToUndo("x".into())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Prep(PrepError::ShapeMismatch {
                    row: 0,
                    expected: 2,
                    found: 3,
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Prep(PrepError::Persistence("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Busy, StatusCode::CONFLICT),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{}", error);
        }
    }

    #[test]
    fn test_code_uses_error_kind() {
        let error = ApiError::Prep(PrepError::Backend("down".into()));
        assert_eq!(error.code(), "backend");
        assert_eq!(ApiError::Busy.code(), "busy");
    }
}
