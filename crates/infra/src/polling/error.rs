//! Polling scheduler error types

use calrelay_domain::CalRelayError;
use thiserror::Error;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No tokio runtime available to spawn the loop on
    #[error("No async runtime available")]
    NoRuntime,

    /// Shutdown did not finish in time
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A loop task panicked or was aborted
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        InfraError(CalRelayError::Internal(err.to_string()))
    }
}

impl From<SchedulerError> for CalRelayError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
