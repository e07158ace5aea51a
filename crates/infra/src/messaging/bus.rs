//! Request/reply channel plus UI broadcast
//!
//! Requests travel over an mpsc channel, each carrying a oneshot for its
//! reply. `STATUS_UPDATE` pushes go over a broadcast channel; with no open
//! UI the send is dropped silently.

use std::sync::Arc;

use async_trait::async_trait;
use calrelay_core::{MessageHandler, MessageSender, UiBroadcaster};
use calrelay_domain::{BackgroundMessage, CalRelayError, MessageReply, Result, UiMessage};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

const DEFAULT_REQUEST_CAPACITY: usize = 64;
const DEFAULT_UI_CAPACITY: usize = 32;

struct Envelope {
    message: BackgroundMessage,
    reply: oneshot::Sender<MessageReply>,
}

pub struct MessageBus {
    requests: mpsc::Sender<Envelope>,
    inbox: Mutex<Option<mpsc::Receiver<Envelope>>>,
    ui: broadcast::Sender<UiMessage>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_REQUEST_CAPACITY, DEFAULT_UI_CAPACITY)
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(requests: usize, ui: usize) -> Self {
        let (tx, rx) = mpsc::channel(requests.max(1));
        let (ui_tx, _) = broadcast::channel(ui.max(1));
        Self { requests: tx, inbox: Mutex::new(Some(rx)), ui: ui_tx }
    }

    /// Sender handle for a relay or UI context
    pub fn client(&self) -> BusClient {
        BusClient { requests: self.requests.clone() }
    }

    /// Receive every `STATUS_UPDATE` broadcast from now on
    pub fn subscribe_ui(&self) -> broadcast::Receiver<UiMessage> {
        self.ui.subscribe()
    }

    /// Dispatch requests to `handler` until `cancel` fires.
    ///
    /// Requests are handled concurrently; in-flight requests finish before
    /// this returns. The bus can be served once. Afterwards every client
    /// gets an error.
    #[instrument(skip_all)]
    pub async fn serve(
        &self,
        handler: Arc<dyn MessageHandler>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let mut inbox = self
            .inbox
            .lock()
            .await
            .take()
            .ok_or_else(|| CalRelayError::Internal("message bus is already served".into()))?;

        info!("Message bus serving");
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                envelope = inbox.recv() => match envelope {
                    Some(envelope) => {
                        let handler = Arc::clone(&handler);
                        in_flight.spawn(dispatch(handler, envelope));
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        warn!(error = %err, "Message handler task failed");
                    }
                }
            }
        }

        inbox.close();
        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Message handler task failed");
            }
        }
        info!("Message bus stopped");
        Ok(())
    }
}

async fn dispatch(handler: Arc<dyn MessageHandler>, envelope: Envelope) {
    let kind = envelope.message.kind();
    debug!(kind, "Dispatching message");
    let reply = handler.handle(envelope.message).await;
    if envelope.reply.send(reply).is_err() {
        debug!(kind, "Sender went away before the reply");
    }
}

impl UiBroadcaster for MessageBus {
    fn broadcast(&self, message: UiMessage) {
        match self.ui.send(message) {
            Ok(receivers) => trace!(receivers, "Broadcast to UI"),
            Err(_) => trace!("No UI open; broadcast dropped"),
        }
    }
}

/// Cloneable sending side of a [`MessageBus`]
#[derive(Clone)]
pub struct BusClient {
    requests: mpsc::Sender<Envelope>,
}

#[async_trait]
impl MessageSender for BusClient {
    async fn send(&self, message: BackgroundMessage) -> Result<MessageReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(Envelope { message, reply: reply_tx })
            .await
            .map_err(|_| CalRelayError::Host("background context is not listening".into()))?;

        reply_rx
            .await
            .map_err(|_| CalRelayError::Host("background context dropped the request".into()))
    }
}
