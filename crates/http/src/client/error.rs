//! Client error types

use serde_json::Value;
use thiserror::Error;

/// Message used when the server gives no usable `message` field
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Message used when a token refresh cannot restore the session
pub const REFRESH_FAILURE_MESSAGE: &str = "token refresh failed, please log in again";

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport error, no response received
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error {status}: {message}")]
    ServerError {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// The session could not be recovered; the user must log in again
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        status: Option<u16>,
        message: String,
        body: Option<Value>,
    },

    /// Server answered 2xx with an envelope marked unsuccessful
    #[error("Rejected by server ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and the parsed body, if any
    pub fn from_status(status: reqwest::StatusCode, body: Option<Value>) -> Self {
        Self::ServerError {
            status: status.as_u16(),
            message: server_message(body.as_ref())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            body,
        }
    }

    /// Authentication failure raised when a refresh cannot restore the session
    pub fn refresh_failed(status: Option<u16>, body: Option<Value>) -> Self {
        Self::AuthenticationFailed {
            status,
            message: REFRESH_FAILURE_MESSAGE.to_string(),
            body,
        }
    }

    /// HTTP status carried by the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::ServerError { status, .. } => Some(*status),
            Self::AuthenticationFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Structured error body returned by the server
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::ServerError { body, .. } | Self::AuthenticationFailed { body, .. } => {
                body.as_ref()
            }
            _ => None,
        }
    }

    /// Whether the caller should send the user back to login
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            Self::ServerError { message, .. }
            | Self::AuthenticationFailed { message, .. }
            | Self::Rejected { message, .. } => message.clone(),
            Self::Request(_) => DEFAULT_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Extract a non-empty `message` string from an error body
fn server_message(body: Option<&Value>) -> Option<String> {
    body?
        .get("message")?
        .as_str()
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_from_status_uses_server_message() {
        let error = ClientError::from_status(
            StatusCode::NOT_FOUND,
            Some(json!({"message": "group not found", "code": "G404"})),
        );

        assert_eq!(error.status(), Some(404));
        assert!(error.is_not_found());
        assert_eq!(error.user_message(), "group not found");
        assert_eq!(error.body().unwrap()["code"], "G404");
    }

    #[test]
    fn test_from_status_falls_back_without_message() {
        for body in [None, Some(json!({"message": ""})), Some(json!([1, 2]))] {
            let error = ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert_eq!(error.user_message(), DEFAULT_FAILURE_MESSAGE);
            assert_eq!(error.status(), Some(500));
            assert!(!error.is_auth_expired());
        }
    }

    #[test]
    fn test_refresh_failed_is_auth_expired() {
        let error = ClientError::refresh_failed(Some(403), None);
        assert!(error.is_auth_expired());
        assert_eq!(error.status(), Some(403));
        assert_eq!(error.user_message(), REFRESH_FAILURE_MESSAGE);
    }
}
