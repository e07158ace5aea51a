//! Port interface for the remote session-processing service

use async_trait::async_trait;
use calrelay_domain::{PollSession, Result};

/// Remote sessions API, authenticated with a bearer token per call
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// `GET /sessions/:id`
    async fn fetch_session(&self, access_token: &str, session_id: &str) -> Result<PollSession>;

    /// `POST /sessions`; returns the new session id
    async fn create_text_session(&self, access_token: &str, text: &str) -> Result<String>;

    /// `POST /sessions/upload`; returns the new session id
    async fn upload_file_session(
        &self,
        access_token: &str,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String>;
}
