//! Client error types

use roombook_core::CoreError;
use thiserror::Error;

/// Application code signalling an expired access token
pub const CODE_AUTH_EXPIRED: i64 = 401;

/// Application code signalling a validation failure
pub const CODE_VALIDATION: i64 = 400;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout, no response was received
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Access token rejected and not recoverable by this request
    #[error("Authentication expired: {0}")]
    AuthExpired(String),

    /// Refresh failed; a redirect to login has been scheduled
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Server rejected the input; the user has already been notified
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other failure reported by the server
    #[error("Server error {status} (code {code}): {message}")]
    Application {
        status: u16,
        code: i64,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credential storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] CoreError),
}

impl ClientError {
    /// Classify a failed response by its application code
    pub fn from_code(status: u16, code: i64, message: String) -> Self {
        match code {
            CODE_AUTH_EXPIRED => Self::AuthExpired(message),
            CODE_VALIDATION => Self::Validation(message),
            _ => Self::Application {
                status,
                code,
                message,
            },
        }
    }

    /// Whether the caller should send the user back to the login view
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired(_) | Self::SessionExpired(_))
    }

    /// Whether the user has already been told about this failure
    pub const fn is_notified(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::SessionExpired(_))
    }
}
