//! API-specific error types
//!
//! Classifies remote failures and carries the human-readable message that
//! ends up in `ActiveJob.errorMessage`.

use std::time::Duration;

use calrelay_domain::CalRelayError;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401, 403
    Authentication,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// 4xx except auth and rate limit
    Client,
    /// Connection failures
    Network,
    Timeout,
    /// Bad base URL or request construction
    Config,
    /// Response body did not match the expected shape
    Decode,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::NotFound(_) | Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Timeout(_) => ApiErrorCategory::Timeout,
            Self::Config(_) => ApiErrorCategory::Config,
            Self::Decode(_) => ApiErrorCategory::Decode,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(_) => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimit(_) => "Too many requests. Please try again shortly.".to_string(),
            Self::Server(_) => "The server had a problem processing this request.".to_string(),
            Self::NotFound(_) => "Session not found.".to_string(),
            Self::Client(detail) if !detail.trim().is_empty() => detail.clone(),
            Self::Client(_) => "The request was rejected.".to_string(),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Timeout(_) => "The server took too long to respond.".to_string(),
            Self::Config(_) => "CalRelay is not configured correctly.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

/// Remote failures cross into the domain carrying the user-facing message.
impl From<ApiError> for CalRelayError {
    fn from(err: ApiError) -> Self {
        let message = err.user_message();
        match err.category() {
            ApiErrorCategory::Authentication => Self::Auth(message),
            ApiErrorCategory::Client if matches!(err, ApiError::NotFound(_)) => {
                Self::NotFound(message)
            }
            ApiErrorCategory::Client => Self::InvalidInput(message),
            ApiErrorCategory::Config => Self::Config(message),
            ApiErrorCategory::Decode => Self::Serialization(message),
            ApiErrorCategory::RateLimit
            | ApiErrorCategory::Server
            | ApiErrorCategory::Network
            | ApiErrorCategory::Timeout => Self::Network(message),
        }
    }
}
