//! API-specific error types
//!
//! Classifies HTTP failures and carries the server's own message so callers
//! can show it to the user.

use std::time::Duration;

use assessor_domain::AssessorError;
use thiserror::Error;

/// Categories of API errors for retry and session handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401/403: the stored credential is no longer accepted
    Authentication,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx
    Client,
    /// Connection failures and timeouts
    Network,
    /// Response body did not match the expected schema
    Decode,
    /// Misconfiguration on our side
    Config,
}

/// API operation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Classify a non-success response. `body` is the raw response text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_server_message(body);
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            429 => Self::RateLimit(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Client { status, message },
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Unauthorized(_) | Self::Forbidden(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// HTTP status behind the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::RateLimit(_) => Some(429),
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            Self::Unauthorized(m) | Self::Forbidden(m) | Self::RateLimit(m) => m,
            Self::Server { message, .. } | Self::Client { message, .. } => message,
            _ => return None,
        };
        let message = message.trim();
        (!message.is_empty()).then_some(message)
    }

    /// Whether the credential must be purged and the user sent to login.
    pub fn is_credential_rejection(&self) -> bool {
        self.category() == ApiErrorCategory::Authentication
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }
}

/// Pull `message` or `error` out of a JSON error body, else use the raw body.
fn extract_server_message(body: &str) -> String {
    let body = body.trim();
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(message)) = fields.get(key) {
                return message.trim().to_string();
            }
        }
        return String::new();
    }
    body.to_string()
}

impl From<ApiError> for AssessorError {
    fn from(err: ApiError) -> Self {
        let server_message = err.server_message().unwrap_or_default().to_string();
        match err {
            ApiError::Unauthorized(_) => Self::Auth(server_message),
            ApiError::Forbidden(_) => Self::Forbidden(server_message),
            ApiError::RateLimit(_) | ApiError::Server { .. } => Self::Server(server_message),
            ApiError::Client { status: 404, .. } => Self::NotFound(server_message),
            ApiError::Client { status: 400 | 422, .. } => Self::Validation(server_message),
            ApiError::Client { .. } => Self::InvalidInput(server_message),
            ApiError::Network(message) => Self::Network(message),
            ApiError::Timeout(after) => Self::Network(format!("request timed out after {after:?}")),
            ApiError::Decode(message) => Self::Decode(message),
            ApiError::Config(message) => Self::Config(message),
        }
    }
}

impl From<AssessorError> for ApiError {
    fn from(err: AssessorError) -> Self {
        match err {
            AssessorError::Config(message) => Self::Config(message),
            AssessorError::Decode(message) => Self::Decode(message),
            other => Self::Network(other.to_string()),
        }
    }
}
