//! Port interfaces for message passing between contexts
//!
//! Nothing fails across a context boundary: a sender that cannot reach the
//! background gets an error value, never a panic, and a broadcast with no
//! open UI is a silent no-op.

use async_trait::async_trait;
use calrelay_domain::{BackgroundMessage, MessageReply, Result, UiMessage};

/// One-shot request to the background context
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: BackgroundMessage) -> Result<MessageReply>;
}

/// Background-side handler for incoming messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: BackgroundMessage) -> MessageReply;
}

/// Push channel to every open UI surface
pub trait UiBroadcaster: Send + Sync {
    fn broadcast(&self, message: UiMessage);
}
