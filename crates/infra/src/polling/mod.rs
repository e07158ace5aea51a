//! Keyed interval timers for session polling

pub mod adapter;
pub mod error;

pub use adapter::TokioPollingAdapter;
pub use error::{SchedulerError, SchedulerResult};
