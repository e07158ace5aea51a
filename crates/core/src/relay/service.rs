//! Auth relay - mirrors the web app's session token into the background
//!
//! The web app keeps `{access_token, refresh_token, expires_at}` as a JSON
//! string in page-local storage. The relay watches that key and sends one
//! message per observed change: `AUTH_TOKEN` for a new triple,
//! `AUTH_SIGNED_OUT` when a previously sent token disappears.
//!
//! Every read, parse or send failure is swallowed. A failed send is not
//! recorded, so the next check retries it.

use std::sync::Arc;
use std::time::Duration;

use calrelay_common::privacy::fingerprint;
use calrelay_domain::{AuthState, BackgroundMessage, RelayConfig, Result, StorageChange};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::messaging::ports::MessageSender;
use crate::storage::ports::StorageArea;

/// Token state as last seen in page storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedToken {
    Present(AuthState),
    Absent,
}

#[derive(Deserialize)]
struct PageToken {
    access_token: String,
    refresh_token: String,
    expires_at: i64,
}

impl ObservedToken {
    /// Interprets the raw page-storage value.
    ///
    /// The value is normally a JSON string; an already-decoded object is
    /// accepted too. Anything malformed counts as absent.
    pub fn from_page_value(value: Option<Value>) -> Self {
        let parsed = match value {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => serde_json::from_str::<PageToken>(&raw).ok(),
            Some(other) => serde_json::from_value::<PageToken>(other).ok(),
        };

        match parsed {
            Some(token) if !token.access_token.is_empty() => Self::Present(AuthState {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_at: token.expires_at,
            }),
            _ => Self::Absent,
        }
    }
}

/// Delay before tick `tick_index` (zero-based): fast during warm-up, slow
/// afterwards.
pub fn relay_delay(tick_index: u32, config: &RelayConfig) -> Duration {
    if tick_index < config.warmup_ticks {
        Duration::from_millis(config.fast_interval_ms)
    } else {
        Duration::from_millis(config.slow_interval_ms)
    }
}

pub struct AuthRelay {
    page_storage: Arc<dyn StorageArea>,
    sender: Arc<dyn MessageSender>,
    config: RelayConfig,
    /// Last state successfully delivered; `None` before the first send
    last_sent: Mutex<Option<ObservedToken>>,
}

impl AuthRelay {
    pub fn new(
        page_storage: Arc<dyn StorageArea>,
        sender: Arc<dyn MessageSender>,
        config: RelayConfig,
    ) -> Self {
        Self { page_storage, sender, config, last_sent: Mutex::new(None) }
    }

    /// Reads page storage once and sends at most one message.
    ///
    /// Returns the message that was delivered, if any.
    pub async fn check(&self) -> Option<BackgroundMessage> {
        let mut last_sent = self.last_sent.lock().await;

        let observed = match self.read_token().await {
            Ok(observed) => observed,
            Err(err) => {
                debug!(error = %err, "Page storage read failed; retrying next tick");
                return None;
            }
        };

        let message = match (&observed, last_sent.as_ref()) {
            (ObservedToken::Present(current), Some(ObservedToken::Present(sent)))
                if current == sent =>
            {
                return None;
            }
            (ObservedToken::Present(current), _) => BackgroundMessage::auth_token(current),
            (ObservedToken::Absent, Some(ObservedToken::Present(_))) => {
                BackgroundMessage::AuthSignedOut
            }
            (ObservedToken::Absent, _) => return None,
        };

        match self.sender.send(message.clone()).await {
            Ok(_) => {
                match &observed {
                    ObservedToken::Present(auth) => {
                        info!(token = %fingerprint(&auth.access_token), "Relayed auth token");
                    }
                    ObservedToken::Absent => info!("Relayed sign-out"),
                }
                *last_sent = Some(observed);
                Some(message)
            }
            Err(err) => {
                debug!(error = %err, kind = message.kind(), "Relay send failed; will retry");
                None
            }
        }
    }

    /// Runs the relay until `cancel` fires.
    ///
    /// Checks once immediately, then on the dual-cadence timer, and
    /// immediately whenever another tab changes the watched key.
    #[instrument(skip(self, cancel), fields(key = %self.config.token_storage_key))]
    pub async fn run(&self, cancel: CancellationToken) {
        let (changed_tx, mut changed_rx) = mpsc::unbounded_channel::<()>();
        let subscription = self.page_storage.subscribe(
            &self.config.token_storage_key,
            Arc::new(move |_change: &StorageChange| {
                let _ = changed_tx.send(());
            }),
        );

        self.check().await;

        let mut tick_index: u32 = 0;
        let mut next_tick = Instant::now() + relay_delay(tick_index, &self.config);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Auth relay cancelled");
                    break;
                }
                _ = tokio::time::sleep_until(next_tick) => {
                    self.check().await;
                    tick_index = tick_index.saturating_add(1);
                    next_tick = Instant::now() + relay_delay(tick_index, &self.config);
                }
                Some(()) = changed_rx.recv() => {
                    debug!("Watched key changed in another tab");
                    self.check().await;
                }
            }
        }

        if !self.page_storage.unsubscribe(subscription) {
            warn!("Relay subscription was already removed");
        }
    }

    async fn read_token(&self) -> Result<ObservedToken> {
        let value = self.page_storage.get(&self.config.token_storage_key).await?;
        Ok(ObservedToken::from_page_value(value))
    }
}
