//! The single in-flight processing record

use serde::{Deserialize, Serialize};

use crate::impl_status_conversions;

/// Lifecycle of an [`ActiveJob`].
///
/// `Processed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Polling,
    Processed,
    Error,
}

impl_status_conversions!(JobStatus {
    Polling => "polling",
    Processed => "processed",
    Error => "error",
});

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Error)
    }
}

/// What the user is currently waiting on.
///
/// Stored in the ephemeral scope under `activeJob` and written only by the
/// background orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJob {
    pub session_id: String,
    pub status: JobStatus,
    pub event_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_title: Option<String>,
    /// Creation time (unix milliseconds)
    pub created_at: i64,
}

impl ActiveJob {
    /// A freshly submitted job waiting on its first poll.
    pub fn polling(session_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            session_id: session_id.into(),
            status: JobStatus::Polling,
            event_count: 0,
            error_message: None,
            session_title: None,
            created_at,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_job_has_no_results() {
        let job = ActiveJob::polling("J1", 42);

        assert_eq!(job.status, JobStatus::Polling);
        assert_eq!(job.event_count, 0);
        assert!(job.error_message.is_none());
        assert!(job.session_title.is_none());
        assert!(!job.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Polling.is_terminal());
        assert!(JobStatus::Processed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn stored_shape_uses_camel_case_and_omits_empty_fields() {
        let job = ActiveJob::polling("J1", 1_000);
        let json = serde_json::to_value(&job).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "sessionId": "J1",
                "status": "polling",
                "eventCount": 0,
                "createdAt": 1_000
            })
        );
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("PROCESSED".parse::<JobStatus>(), Ok(JobStatus::Processed));
        assert_eq!(JobStatus::Error.to_string(), "error");
        assert!("done".parse::<JobStatus>().is_err());
    }
}
