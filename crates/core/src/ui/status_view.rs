//! Status view - stateless reader of the stored job
//!
//! A UI surface opens a view, renders whatever the watch channel holds and
//! sends commands to the background. It never writes `activeJob` itself.

use std::sync::Arc;

use calrelay_domain::constants::ACTIVE_JOB_KEY;
use calrelay_domain::{
    ActiveJob, BackgroundMessage, CalRelayError, MessageReply, Result, StorageChange,
};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::messaging::ports::MessageSender;
use crate::storage::ports::{StorageArea, SubscriptionId};

fn decode_job(value: Option<&Value>) -> Option<ActiveJob> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

pub struct StatusView {
    storage: Arc<dyn StorageArea>,
    sender: Arc<dyn MessageSender>,
    state: Arc<watch::Sender<Option<ActiveJob>>>,
    subscription: SubscriptionId,
}

impl StatusView {
    /// Subscribes to `activeJob` and seeds the view from storage.
    pub async fn open(
        storage: Arc<dyn StorageArea>,
        sender: Arc<dyn MessageSender>,
    ) -> Result<Self> {
        let (state, _) = watch::channel(None);
        let state = Arc::new(state);

        let listener_state = Arc::clone(&state);
        let subscription = storage.subscribe(
            ACTIVE_JOB_KEY,
            Arc::new(move |change: &StorageChange| {
                listener_state.send_replace(decode_job(change.new_value.as_ref()));
            }),
        );

        match storage.get(ACTIVE_JOB_KEY).await {
            Ok(value) => {
                state.send_replace(decode_job(value.as_ref()));
            }
            Err(err) => {
                storage.unsubscribe(subscription);
                return Err(err);
            }
        }

        Ok(Self { storage, sender, state, subscription })
    }

    /// Latest stored job
    pub fn current(&self) -> Option<ActiveJob> {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Option<ActiveJob>> {
        self.state.subscribe()
    }

    /// Dismisses the current job (`CLEAR_JOB`).
    pub async fn dismiss(&self) -> Result<()> {
        self.command(BackgroundMessage::ClearJob).await
    }

    /// Opens the processed session in the web app, then dismisses the job.
    pub async fn open_result(&self, access_token: &str) -> Result<()> {
        let job = self
            .current()
            .ok_or_else(|| CalRelayError::NotFound("No job to open".into()))?;

        self.command(BackgroundMessage::OpenSession {
            session_id: job.session_id,
            access_token: access_token.to_string(),
        })
        .await?;
        self.dismiss().await
    }

    pub async fn sign_in(&self) -> Result<()> {
        self.command(BackgroundMessage::SignIn).await
    }

    async fn command(&self, message: BackgroundMessage) -> Result<()> {
        let kind = message.kind();
        match self.sender.send(message).await? {
            MessageReply::Rejected { reason } => {
                warn!(kind, %reason, "Background rejected command");
                Err(CalRelayError::InvalidInput(reason))
            }
            _ => {
                debug!(kind, "Command acknowledged");
                Ok(())
            }
        }
    }
}

impl Drop for StatusView {
    fn drop(&mut self) {
        self.storage.unsubscribe(self.subscription);
    }
}
