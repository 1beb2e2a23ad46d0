//! Uniform response envelope
//!
//! Every route answers with exactly one of two shapes:
//! `{message, data, status}` on success or `{error, status}` on failure.
//! The embedded `status` field always mirrors the HTTP status actually sent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Response envelope returned by every route
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success {
        message: String,
        data: serde_json::Value,
        status: u16,
    },
    Failure {
        error: String,
        status: u16,
    },
}

impl Envelope {
    /// Success envelope with HTTP 200.
    pub fn success(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self::success_with_status(message, data, StatusCode::OK)
    }

    /// Success envelope with an explicit status (e.g. 201).
    pub fn success_with_status(
        message: impl Into<String>,
        data: serde_json::Value,
        status: StatusCode,
    ) -> Self {
        Envelope::Success {
            message: message.into(),
            data,
            status: status.as_u16(),
        }
    }

    /// Failure envelope.
    pub fn failure(error: impl Into<String>, status: StatusCode) -> Self {
        Envelope::Failure {
            error: error.into(),
            status: status.as_u16(),
        }
    }

    /// The HTTP status this envelope is sent with.
    pub fn status_code(&self) -> StatusCode {
        let status = match self {
            Envelope::Success { status, .. } => *status,
            Envelope::Failure { status, .. } => *status,
        };
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let env = Envelope::success("templates fetched", serde_json::json!([{"vmid": 100}]));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["message"], "templates fetched");
        assert_eq!(v["status"], 200);
        assert_eq!(v["data"][0]["vmid"], 100);
        assert!(v.get("error").is_none());
    }

    #[test]
    fn test_failure_shape() {
        let env = Envelope::failure("server 999 not found", StatusCode::NOT_FOUND);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["error"], "server 999 not found");
        assert_eq!(v["status"], 404);
        assert!(v.get("message").is_none());
        assert!(v.get("data").is_none());
    }

    #[test]
    fn test_status_mirrors_http() {
        let env = Envelope::failure("boom", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(env.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let env = Envelope::success_with_status("created", serde_json::json!({}), StatusCode::CREATED);
        assert_eq!(env.status_code(), StatusCode::CREATED);
    }
}
