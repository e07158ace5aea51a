//! HTTP implementation of the sessions port

use std::time::Duration;

use async_trait::async_trait;
use calrelay_core::SessionApi;
use calrelay_domain::{ApiConfig, PollSession, Result, SessionCreated};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::ApiError;
use crate::http::{HttpClient, TransportError};

/// Error body returned by the processing service
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Sessions API client
pub struct SessionsClient {
    http: HttpClient,
    base_url: Url,
}

impl SessionsClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be created
    pub fn new(config: &ApiConfig) -> std::result::Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("Invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("Base URL cannot be a base: {base_url}")));
        }

        let http = HttpClient::builder()
            .attempt_timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .max_attempts(config.max_attempts as usize)
            .user_agent(concat!("calrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config("Base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /sessions/:id`
    #[instrument(skip(self, access_token))]
    pub async fn get_session(
        &self,
        access_token: &str,
        session_id: &str,
    ) -> std::result::Result<PollSession, ApiError> {
        let url = self.endpoint(&["sessions", session_id])?;
        let request = self.http.request(Method::GET, url.clone()).bearer_auth(access_token);
        let response = self.execute(request).await?;
        let session: PollSession = read_json(response, &url).await?;
        debug!(status = %session.status, "Fetched session");
        Ok(session)
    }

    /// `POST /sessions` with a text body
    ///
    /// Not idempotent, so the transport sends it once.
    #[instrument(skip(self, access_token, text))]
    pub async fn create_text(
        &self,
        access_token: &str,
        text: &str,
    ) -> std::result::Result<SessionCreated, ApiError> {
        let url = self.endpoint(&["sessions"])?;
        let request = self
            .http
            .request(Method::POST, url.clone())
            .bearer_auth(access_token)
            .json(&json!({ "text": text }));
        let response = self.execute(request).await?;
        let created: SessionCreated = read_json(response, &url).await?;
        info!(session_id = %created.id, "Text session created");
        Ok(created)
    }

    /// `POST /sessions/upload` with a multipart `file` field
    #[instrument(skip(self, access_token, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        access_token: &str,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<SessionCreated, ApiError> {
        let url = self.endpoint(&["sessions", "upload"])?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| ApiError::Client(format!("Invalid file type: {e}")))?;
        let request = self
            .http
            .request(Method::POST, url.clone())
            .bearer_auth(access_token)
            .multipart(Form::new().part("file", part));
        let response = self.execute(request).await?;
        let created: SessionCreated = read_json(response, &url).await?;
        info!(session_id = %created.id, "File session created");
        Ok(created)
    }

    async fn execute(&self, request: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let response = self.http.send(request).await.map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_transport_error(err: TransportError) -> ApiError {
    match err {
        TransportError::TimedOut(after) => ApiError::Timeout(after),
        TransportError::InvalidRequest(msg) => ApiError::Config(msg),
        TransportError::Connect(msg) | TransportError::Other(msg) => ApiError::Network(msg),
    }
}

fn map_status_error(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_default();
    let summary = format!("HTTP {}", status.as_u16());
    warn!(status = status.as_u16(), %detail, "Sessions API returned an error");

    match status.as_u16() {
        401 | 403 => ApiError::Auth(summary),
        404 => ApiError::NotFound(summary),
        429 => ApiError::RateLimit(summary),
        500..=599 => ApiError::Server(summary),
        _ => ApiError::Client(detail),
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    url: &Url,
) -> std::result::Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(format!("{}: {e}", url.path())))
}

#[async_trait]
impl SessionApi for SessionsClient {
    async fn fetch_session(&self, access_token: &str, session_id: &str) -> Result<PollSession> {
        Ok(self.get_session(access_token, session_id).await?)
    }

    async fn create_text_session(&self, access_token: &str, text: &str) -> Result<String> {
        Ok(self.create_text(access_token, text).await?.id)
    }

    async fn upload_file_session(
        &self,
        access_token: &str,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        Ok(self.upload(access_token, file_name, mime_type, bytes).await?.id)
    }
}
