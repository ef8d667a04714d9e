//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the assessor client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AssessorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssessorError {
    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Validation(_) => "validation",
            Self::Decode(_) => "decode",
            Self::Storage(_) => "storage",
            Self::Server(_) => "server",
            Self::Internal(_) => "internal",
        }
    }

    /// Message shown to the user, without the category prefix.
    ///
    /// Empty messages fall back to a generic text so a toast is never blank.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Config(m)
            | Self::Network(m)
            | Self::Auth(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::InvalidInput(m)
            | Self::Validation(m)
            | Self::Decode(m)
            | Self::Storage(m)
            | Self::Server(m)
            | Self::Internal(m) => m.trim(),
        };

        if message.is_empty() {
            crate::constants::GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message.to_string()
        }
    }

    /// Whether the failure means the stored credential is no longer usable.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Forbidden(_))
    }
}

/// Result type alias for assessor operations
pub type Result<T> = std::result::Result<T, AssessorError>;
