use std::time::Duration;

use calrelay_domain::CalRelayError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// A request that produced no HTTP response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A single attempt, or the whole retry budget, ran out of time
    #[error("no response within {0:?}")]
    TimedOut(Duration),

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    fn from_reqwest(err: reqwest::Error, attempt_timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::TimedOut(attempt_timeout)
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }

    fn is_transient(&self) -> bool {
        matches!(self, Self::TimedOut(_) | Self::Connect(_))
    }
}

/// Sessions API transport.
///
/// Idempotent requests are retried on 5xx responses and on connect or
/// timeout failures. Anything else, `POST` in particular, goes out exactly
/// once, since a server may have acted on a request it then failed to
/// answer.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    attempt_timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Wall-clock limit for one [`send`](Self::send): every attempt at its
    /// own timeout plus the backoff sleeps between them.
    pub fn budget(&self) -> Duration {
        let sleeps: Duration = (1..self.max_attempts).map(|n| self.backoff_delay(n)).sum();
        self.attempt_timeout.saturating_mul(self.max_attempts as u32).saturating_add(sleeps)
    }

    /// Sends `builder`, retrying only when its method is idempotent.
    ///
    /// The last HTTP response is returned whatever its status; only a
    /// missing response is an error.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
        let request = builder
            .build()
            .map_err(|err| TransportError::from_reqwest(err, self.attempt_timeout))?;
        let attempts = if request.method().is_idempotent() { self.max_attempts } else { 1 };

        let budget = self.budget();
        match tokio::time::timeout(budget, self.send_attempts(request, attempts)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?budget, "HTTP retry budget exhausted");
                Err(TransportError::TimedOut(budget))
            }
        }
    }

    async fn send_attempts(
        &self,
        request: reqwest::Request,
        attempts: usize,
    ) -> Result<Response, TransportError> {
        let method = request.method().clone();
        let url = request.url().clone();
        let mut pending = Some(request);

        for attempt in 1..=attempts {
            let last = attempt == attempts;
            // Keep a copy for the next attempt; bodies that cannot be cloned
            // (multipart streams) get this attempt only.
            let Some(current) = pending.take() else { break };
            pending = if last { None } else { current.try_clone() };
            let can_retry = pending.is_some();

            debug!(attempt, %method, %url, "Sending HTTP request");
            match self.client.execute(current).await {
                Ok(response) if response.status().is_server_error() && can_retry => {
                    debug!(attempt, status = %response.status(), "Server error; retrying");
                }
                Ok(response) => {
                    debug!(attempt, status = %response.status(), "Received HTTP response");
                    return Ok(response);
                }
                Err(err) => {
                    let err = TransportError::from_reqwest(err, self.attempt_timeout);
                    if !(can_retry && err.is_transient()) {
                        return Err(err);
                    }
                    debug!(attempt, error = %err, "Transient failure; retrying");
                }
            }

            let delay = self.backoff_delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Err(TransportError::Other(format!("{method} {url} produced no response")))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift)
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    attempt_timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Timeout of a single attempt, response body included.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Total attempts for idempotent requests, the first one included.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, CalRelayError> {
        let mut builder = ReqwestClient::builder().timeout(self.attempt_timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|err| CalRelayError::from(InfraError::from(err)))?;

        Ok(HttpClient {
            client,
            attempt_timeout: self.attempt_timeout,
            max_attempts: self.max_attempts,
            base_backoff: self.base_backoff,
        })
    }
}
