//! Error types used throughout the workspace

use calrelay_common::error::{ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CalRelay
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalRelayError {
    /// Durable or ephemeral storage area failed
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A host capability (panel, window, toolbar) rejected the call
    #[error("Host error: {0}")]
    Host(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CalRelayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl CalRelayError {
    /// Message carried by the variant, without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Storage(msg)
            | Self::Config(msg)
            | Self::Host(msg)
            | Self::Network(msg)
            | Self::Auth(msg)
            | Self::Serialization(msg)
            | Self::NotFound(msg)
            | Self::InvalidInput(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl ErrorClassification for CalRelayError {
    /// Host storage and host capability failures are transient; the next
    /// tick or page check repeats the operation.
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Host(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Storage(_) | Self::Host(_) => ErrorSeverity::Warning,
            Self::NotFound(_) | Self::InvalidInput(_) => ErrorSeverity::Info,
            Self::Network(_) | Self::Auth(_) | Self::Serialization(_) | Self::Config(_) => {
                ErrorSeverity::Error
            }
            Self::Internal(_) => ErrorSeverity::Critical,
        }
    }
}

/// Result type alias for CalRelay operations
pub type Result<T> = std::result::Result<T, CalRelayError>;
