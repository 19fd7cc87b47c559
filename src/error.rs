//! Ledger error types with HTTP status code mapping.
//!
//! [`LedgerError`] is the central error type for the service. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "level 3 would raise character past level 20",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 4000–4999 | League Policy   | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Character with the given ID was not found.
    #[error("character not found: {0}")]
    CharacterNotFound(uuid::Uuid),

    /// Log entry with the given ID was not found.
    #[error("log not found: {0}")]
    LogNotFound(uuid::Uuid),

    /// Dungeon master with the given ID was not found.
    #[error("dungeon master not found: {0}")]
    DungeonMasterNotFound(uuid::Uuid),

    /// DM log is already attached to a character.
    #[error("log {0} is already attached to a character")]
    LogAlreadyAttached(uuid::Uuid),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A level delta would raise the character past the league cap.
    #[error("level {requested} would raise character past level {cap}")]
    LevelCapExceeded {
        /// League level cap (20).
        cap: u32,
        /// Offending level delta.
        requested: u32,
    },

    /// A loss reference does not resolve to an earlier grant.
    #[error("loss reference does not match an earlier grant: {0}")]
    UnknownLossReference(uuid::Uuid),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::CharacterNotFound(_) => 2001,
            Self::LogNotFound(_) => 2002,
            Self::DungeonMasterNotFound(_) => 2003,
            Self::LogAlreadyAttached(_) => 2004,
            Self::LevelCapExceeded { .. } => 4001,
            Self::UnknownLossReference(_) => 4002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::CharacterNotFound(_) | Self::LogNotFound(_) | Self::DungeonMasterNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::LogAlreadyAttached(_) => StatusCode::CONFLICT,
            Self::LevelCapExceeded { .. } | Self::UnknownLossReference(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        let err = LedgerError::InvalidRequest("log name is required".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn not_found_errors_map_to_404() {
        let err = LedgerError::CharacterNotFound(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn policy_errors_map_to_422() {
        let err = LedgerError::LevelCapExceeded {
            cap: 20,
            requested: 3,
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), 4001);
    }

    #[test]
    fn attach_conflict_maps_to_409() {
        let err = LedgerError::LogAlreadyAttached(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
