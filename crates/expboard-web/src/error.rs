//! HTTP error mapping for the JSON API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use expboard_core::ExpError;
use serde::Serialize;

/// Error body returned by every failing API call.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An API failure, already mapped to a status code and a caller-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Experiment not found".to_string(),
        }
    }

    /// Map a core error. Store failures are logged with their cause and
    /// reported to the caller only as `context`.
    pub fn from_core(err: ExpError, context: &'static str) -> Self {
        match err {
            ExpError::ValidationError(message) => Self::bad_request(message),
            ExpError::ExperimentNotFound(_) => Self::not_found(),
            ExpError::Database(source) => {
                tracing::error!(error = %source, "{}", context);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: context.to_string(),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expboard_db::DbError;

    #[test]
    fn test_core_error_mapping() {
        let err = ApiError::from_core(ExpError::validation("Name is required"), "ctx");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Name is required");

        let err = ApiError::from_core(ExpError::ExperimentNotFound(9), "ctx");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from_core(
            ExpError::Database(DbError::Migration("disk on fire".to_string())),
            "Failed to fetch experiments",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch experiments");
    }
}
