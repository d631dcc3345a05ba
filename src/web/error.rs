use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::store::StoreError;
use crate::services::line_client::LineError;
use crate::services::time_budget::RequiredTimeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Identity provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Bad identity provider response: {0}")]
    BadUpstreamResponse(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppError {
    /// Stable identifier clients can match on.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "validation",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::BadUpstreamResponse(_) => "bad_upstream_response",
            AppError::DatabaseError(_) => "database",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UpstreamUnavailable(_) | AppError::BadUpstreamResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let error_message = match self {
            AppError::InvalidInput(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::UpstreamUnavailable(msg)
            | AppError::BadUpstreamResponse(msg) => msg,
            AppError::DatabaseError(msg) => format!("Database error: {msg}"),
        };
        (status, Json(serde_json::json!({ "kind": kind, "error": error_message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::Conflict(format!("{what} already exists.")),
            StoreError::Database(db_err) => AppError::DatabaseError(db_err.to_string()),
        }
    }
}

impl From<LineError> for AppError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::MissingCredential | LineError::Rejected(_) => {
                AppError::Unauthenticated(err.to_string())
            }
            LineError::Unavailable(_) => AppError::UpstreamUnavailable(err.to_string()),
            LineError::BadResponse(_) => AppError::BadUpstreamResponse(err.to_string()),
        }
    }
}

// Malformed bodies and path segments get the same JSON error shape as
// everything else.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<RequiredTimeError> for AppError {
    fn from(err: RequiredTimeError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
