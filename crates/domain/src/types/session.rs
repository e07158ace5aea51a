//! Remote session resource (consumed, never owned)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_status_conversions;

/// Processing status reported by `GET /sessions/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Processing,
    Processed,
    Error,
    /// Any status this client does not know yet; treated as still running.
    #[serde(other)]
    Unknown,
}

impl_status_conversions!(SessionStatus {
    Pending => "pending",
    Processing => "processing",
    Processed => "processed",
    Error => "error",
    Unknown => "unknown",
});

/// Session as returned by the processing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollSession {
    pub id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub event_ids: Option<Vec<String>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PollSession {
    /// Number of calendar events produced so far.
    #[must_use]
    pub fn event_count(&self) -> u32 {
        self.event_ids
            .as_ref()
            .map_or(0, |ids| u32::try_from(ids.len()).unwrap_or(u32::MAX))
    }
}

/// Response body of `POST /sessions` and `POST /sessions/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreated {
    pub id: String,
}
