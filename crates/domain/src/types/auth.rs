//! Signed-in state relayed from the web app

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token triple held in durable storage under `authState`.
///
/// Absence of the record means "signed out".
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (unix seconds)
    pub expires_at: i64,
}

impl AuthState {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }
}

// Tokens never reach logs.
impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
