//! Error handling module for the SkillShare client.
//!
//! Every failure of a user action ends up as a [`ClientError`]. Callers show
//! [`ClientError::user_message`] in a toast; nothing is retried automatically.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const AUTH_REQUIRED: &str = "AUTH_REQUIRED";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const REALTIME_ERROR: &str = "REALTIME_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),
    /// Action needs an authenticated identity
    #[error("Please log in to continue")]
    AuthRequired,
    /// Backend answered with a non-success status
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("request failed"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    /// Transport level failure (connect, timeout, body)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
    /// Message broker or WebSocket failure
    #[error("Realtime error: {0}")]
    Realtime(String),
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
    /// Local file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => codes::VALIDATION_ERROR,
            ClientError::AuthRequired => codes::AUTH_REQUIRED,
            ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                codes::UNAUTHORIZED
            }
            ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND => {
                codes::NOT_FOUND
            }
            ClientError::Api { .. } => codes::SERVER_ERROR,
            ClientError::Http(_) => codes::HTTP_ERROR,
            ClientError::Decode(_) => codes::DECODE_ERROR,
            ClientError::Realtime(_) => codes::REALTIME_ERROR,
            ClientError::Config(_) => codes::CONFIG_ERROR,
            ClientError::Io(_) => codes::IO_ERROR,
        }
    }

    /// Message to show the user.
    ///
    /// Validation and auth errors carry their own text. Server errors use the
    /// message the backend sent when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::AuthRequired => self.to_string(),
            ClientError::Api {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Build an API error from a failed response body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        ClientError::Api {
            status,
            message: ErrorBody::message_from(body),
        }
    }
}

/// Error body shapes the backend produces.
///
/// Controllers answer `{"message": ...}`, `{"error": ...}` or a bare string.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn message_from(body: &str) -> Option<String> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        match serde_json::from_str::<ErrorBody>(trimmed) {
            Ok(parsed) => parsed.message.or(parsed.error),
            Err(_) if !trimmed.starts_with('{') && !trimmed.starts_with('<') => {
                Some(trimmed.to_string())
            }
            Err(_) => None,
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_preferred() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Community name taken","error":"Bad Request"}"#,
        );
        assert_eq!(err.user_message("Failed"), "Community name taken");
        assert_eq!(err.error_code(), codes::SERVER_ERROR);
    }

    #[test]
    fn test_error_field_used() {
        let err =
            ClientError::from_response(StatusCode::UNAUTHORIZED, r#"{"error":"Unauthorized"}"#);
        assert_eq!(err.user_message("Failed"), "Unauthorized");
        assert_eq!(err.error_code(), codes::UNAUTHORIZED);
    }

    #[test]
    fn test_plain_text_body() {
        let err =
            ClientError::from_response(StatusCode::BAD_REQUEST, "Please select a file to upload");
        assert_eq!(err.user_message("Failed"), "Please select a file to upload");
    }

    #[test]
    fn test_generic_fallback() {
        let err = ClientError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message("Failed to like post"), "Failed to like post");

        let err = ClientError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html></html>");
        assert_eq!(err.user_message("Failed to like post"), "Failed to like post");
    }

    #[test]
    fn test_validation_message_passthrough() {
        let err = ClientError::Validation("Only image and video files are allowed".to_string());
        assert_eq!(err.user_message("ignored"), "Only image and video files are allowed");
        assert!(err.is_validation());
    }
}
