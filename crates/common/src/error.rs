//! Error types for PVEGate

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::Envelope;

/// Result type alias using PVEGate Error
pub type Result<T> = std::result::Result<T, Error>;

/// PVEGate error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status this error maps to at the handler boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            // Upstream failures (network, timeout, non-2xx) are reported as
            // one 500-class failure per request; no retry happens here.
            Error::Upstream(_) | Error::Timeout { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Io(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::InvalidConfig(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for a missing record of a given kind.
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        Error::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<Error> for Envelope {
    fn from(e: Error) -> Self {
        Envelope::failure(e.to_string(), e.status())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        Envelope::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Unauthenticated("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Forbidden("role not allowed".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::not_found("server", 101).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Validation("vmid is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Upstream("connection refused".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Timeout { seconds: 10 }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_failure_envelope_mirrors_status() {
        let env = Envelope::from(Error::not_found("server", 999));
        assert_eq!(env.status_code(), StatusCode::NOT_FOUND);
    }
}
