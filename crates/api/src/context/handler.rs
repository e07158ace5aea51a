//! Message handler decorator that logs every dispatch

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use calrelay_core::MessageHandler;
use calrelay_domain::{BackgroundMessage, MessageReply};

use crate::utils::logging::log_message_handled;

pub struct TracedHandler {
    inner: Arc<dyn MessageHandler>,
}

impl TracedHandler {
    pub fn new(inner: Arc<dyn MessageHandler>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MessageHandler for TracedHandler {
    async fn handle(&self, message: BackgroundMessage) -> MessageReply {
        let kind = message.kind();
        let started = Instant::now();
        let reply = self.inner.handle(message).await;
        log_message_handled(kind, started.elapsed(), !matches!(reply, MessageReply::Rejected { .. }));
        reply
    }
}
