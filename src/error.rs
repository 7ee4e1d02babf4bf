//! Marketplace error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

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
///     "code": 1001,
///     "message": "validation failed: payment of 25 is below the 30 minimum",
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
    /// Numeric error code (see [`MarketError`] code ranges).
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
/// | Range     | Category              | HTTP Status                   |
/// |-----------|-----------------------|-------------------------------|
/// | 1000–1999 | Validation / Identity | 400 Bad Request / 401         |
/// | 2000–2999 | Ownership / State     | 403 / 404 / 409               |
/// | 3000–3999 | Server / Upstream     | 500 / 502                     |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up (e.g. `"case"`).
        entity: &'static str,
        /// Identifier that missed.
        id: uuid::Uuid,
    },

    /// Request carried no usable caller identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller does not own, or may not act on, the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing or malformed fields, underpayment.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transition not allowed from the record's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A collaborator outside the ledger failed (notification sink, rate source).
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Shorthand for [`MarketError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<uuid::Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::Unauthorized(_) => 1401,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2002,
            Self::Forbidden(_) => 2003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Upstream(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for MarketError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
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
    fn taxonomy_maps_to_distinct_statuses() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            MarketError::not_found("case", id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            MarketError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            MarketError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MarketError::Upstream("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        let id = uuid::Uuid::new_v4();
        let msg = MarketError::not_found("emergency", id).to_string();
        assert!(msg.starts_with("emergency not found"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn response_carries_code_and_status() {
        let response = MarketError::Conflict("already converted".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
