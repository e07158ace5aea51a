//! Error classification shared by every crate in the workspace
//!
//! Error enums stay local to the crate that owns them; this module only
//! provides a uniform way to ask two questions of any error:
//!
//! 1. Is the failure transient, so the same operation may succeed on the next
//!    attempt or tick?
//! 2. How loudly should it be logged?
//!
//! ```rust
//! use calrelay_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum WidgetError {
//!     Busy,
//!     Broken,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Busy => ErrorSeverity::Warning,
//!             Self::Broken => ErrorSeverity::Error,
//!         }
//!     }
//! }
//!
//! assert!(WidgetError::Busy.is_retryable());
//! assert!(!WidgetError::Broken.is_critical());
//! ```

use std::fmt;
use std::time::Duration;

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: host storage hiccups, a suspended
    /// context, lock contention. Retrying the same operation later may
    /// succeed.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for logging decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
