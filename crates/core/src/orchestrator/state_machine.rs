//! Pure job transitions
//!
//! `polling -> processed | error`, both terminal. Nothing here touches
//! storage; the service decides whether a transition still applies to the
//! stored record.

use calrelay_domain::constants::{
    BADGE_ERROR_COLOR, BADGE_ERROR_TEXT, BADGE_POLLING_COLOR, BADGE_POLLING_TEXT,
    BADGE_PROCESSED_COLOR,
};
use calrelay_domain::{ActiveJob, JobStatus, PollSession, SessionStatus};

const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";

/// Result of applying one poll response to a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTransition {
    /// Remote still working; keep polling
    Continue,
    /// Job reached a terminal state
    Complete(ActiveJob),
}

/// Maps a fetched session onto the current job.
///
/// A job that is already terminal never changes.
pub fn apply_poll(job: &ActiveJob, session: &PollSession) -> PollTransition {
    if job.is_terminal() {
        return PollTransition::Continue;
    }

    match session.status {
        SessionStatus::Pending | SessionStatus::Processing | SessionStatus::Unknown => {
            PollTransition::Continue
        }
        SessionStatus::Processed => PollTransition::Complete(ActiveJob {
            status: JobStatus::Processed,
            event_count: session.event_count(),
            session_title: session.title.clone(),
            error_message: None,
            ..job.clone()
        }),
        SessionStatus::Error => {
            let message = session
                .error_message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            PollTransition::Complete(fail(job, message))
        }
    }
}

/// Terminal error state with a human-readable message
pub fn fail(job: &ActiveJob, message: impl Into<String>) -> ActiveJob {
    ActiveJob { status: JobStatus::Error, error_message: Some(message.into()), ..job.clone() }
}

/// Toolbar badge for a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: Option<&'static str>,
}

impl Badge {
    pub fn cleared() -> Self {
        Self { text: String::new(), color: None }
    }
}

pub fn badge_for(job: Option<&ActiveJob>) -> Badge {
    let Some(job) = job else {
        return Badge::cleared();
    };

    match job.status {
        JobStatus::Polling => {
            Badge { text: BADGE_POLLING_TEXT.to_string(), color: Some(BADGE_POLLING_COLOR) }
        }
        JobStatus::Processed => {
            Badge { text: job.event_count.to_string(), color: Some(BADGE_PROCESSED_COLOR) }
        }
        JobStatus::Error => {
            Badge { text: BADGE_ERROR_TEXT.to_string(), color: Some(BADGE_ERROR_COLOR) }
        }
    }
}
