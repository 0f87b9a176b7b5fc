// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_db::{DbError, JourneyWriteError};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Journey not found: {0}")]
    JourneyNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Write conflict persisted after {attempts} attempts")]
    WriteContention { attempts: u32 },

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a failed journey append onto the API taxonomy. The session id is
    /// threaded in because the write error does not carry it.
    pub fn from_journey_write(err: JourneyWriteError, session_id: &str) -> Self {
        match err {
            JourneyWriteError::NotFound => ApiError::JourneyNotFound(session_id.to_string()),
            JourneyWriteError::Conflict { attempts } => ApiError::WriteContention { attempts },
            JourneyWriteError::Db(db_err) => ApiError::Database(db_err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::JourneyNotFound(id) => {
                tracing::warn!(session_id = %id, "Journey not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Journey not found", format!("Session ID: {}", id)),
                )
            }
            ApiError::PostNotFound(slug) => {
                tracing::warn!(post = %slug, "Post not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Post not found", format!("Post: {}", slug)),
                )
            }
            ApiError::NotFound(what) => {
                tracing::warn!(resource = %what, "Not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Not found", what.clone()),
                )
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!(message = %msg, "Unauthorized");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::with_details("Unauthorized", msg.clone()),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
            // Surfaced only after the retry budget is spent.
            ApiError::WriteContention { attempts } => {
                tracing::error!(attempts = attempts, "Write conflict persisted after retries");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details(
                        "Write contention",
                        format!("gave up after {} attempts", attempts),
                    ),
                )
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Database error", db_err.to_string()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
