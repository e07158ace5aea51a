//! Cross-context message protocol
//!
//! Every message is a JSON object tagged by its `type` field. Payload fields
//! are camelCase, matching the shape the page and UI contexts produce.

use serde::{Deserialize, Serialize};

use super::{ActiveJob, AuthState, WindowId};

/// Messages handled by the background orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum BackgroundMessage {
    /// Page relay saw a new token triple
    AuthToken { access_token: String, refresh_token: String, expires_at: i64 },
    /// Page relay saw the token disappear
    AuthSignedOut,
    GetAuth,
    SignIn,
    GetStatus,
    OpenSession { session_id: String, access_token: String },
    ClearJob,
    /// Track an already-created remote session
    SubmitJob { session_id: String },
    SubmitText { text: String },
    /// File upload; `data` is base64 encoded
    SubmitFile { file_name: String, mime_type: String, data: String },
    OpenPanel {
        #[serde(default)]
        window_id: Option<WindowId>,
        #[serde(default)]
        session_id: Option<String>,
    },
}

impl BackgroundMessage {
    /// Wire tag, used as a log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthToken { .. } => "AUTH_TOKEN",
            Self::AuthSignedOut => "AUTH_SIGNED_OUT",
            Self::GetAuth => "GET_AUTH",
            Self::SignIn => "SIGN_IN",
            Self::GetStatus => "GET_STATUS",
            Self::OpenSession { .. } => "OPEN_SESSION",
            Self::ClearJob => "CLEAR_JOB",
            Self::SubmitJob { .. } => "SUBMIT_JOB",
            Self::SubmitText { .. } => "SUBMIT_TEXT",
            Self::SubmitFile { .. } => "SUBMIT_FILE",
            Self::OpenPanel { .. } => "OPEN_PANEL",
        }
    }

    /// Builds an `AUTH_TOKEN` message from a stored triple.
    #[must_use]
    pub fn auth_token(auth: &AuthState) -> Self {
        Self::AuthToken {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            expires_at: auth.expires_at,
        }
    }
}

/// Push notifications from the background to open UI surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiMessage {
    StatusUpdate { job: Option<ActiveJob> },
}

/// Reply to a [`BackgroundMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum MessageReply {
    Ack,
    Auth { auth: Option<AuthState> },
    Status { job: Option<ActiveJob> },
    Submitted { session_id: String },
    Rejected { reason: String },
}
