//! Request-level error taxonomy and its HTTP mapping.
//!
//! Every handler and the orchestrator speak this one error type; anything a
//! storage backend reports that is not an explicit not-found or duplicate
//! collapses to [`Error::ProcessingFailed`] after logging.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Errors surfaced to HTTP callers.
///
/// The `Display` strings are the exact `error` values of the JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Credential failed verification.
    #[error("unauthorized")]
    Unauthorized,
    /// Token signature, structure, or signing algorithm is wrong.
    #[error("token is invalid")]
    InvalidToken,
    /// Token is structurally fine but past its expiry.
    #[error("token is expired")]
    ExpiredToken,
    /// Malformed or out-of-range request input.
    #[error("invalid parameters")]
    InvalidParameters,
    /// No non-deleted record matches the requested id.
    #[error("no record found")]
    NoRecordFound,
    /// A non-deleted company already uses the requested name.
    #[error("duplicate record")]
    DuplicateRecord,
    /// Any unexpected store or internal failure.
    #[error("request could not be processed")]
    ProcessingFailed,
}

impl Error {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidToken | Self::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::InvalidParameters => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NoRecordFound => StatusCode::NOT_FOUND,
            Self::DuplicateRecord => StatusCode::CONFLICT,
            Self::ProcessingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body, `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Build a body from anything displayable.
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self))).into_response()
    }
}
