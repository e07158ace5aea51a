//! Message bus request/reply and UI broadcast

use std::sync::Arc;

use async_trait::async_trait;
use calrelay_core::{MessageHandler, MessageSender, UiBroadcaster};
use calrelay_domain::{ActiveJob, BackgroundMessage, CalRelayError, MessageReply, UiMessage};
use calrelay_infra::MessageBus;
use tokio_util::sync::CancellationToken;

struct EchoHandler;

#[async_trait]
impl MessageHandler for EchoHandler {
    async fn handle(&self, message: BackgroundMessage) -> MessageReply {
        match message {
            BackgroundMessage::SubmitJob { session_id } => MessageReply::Submitted { session_id },
            BackgroundMessage::GetStatus => MessageReply::Status { job: None },
            other => MessageReply::Rejected { reason: other.kind().to_string() },
        }
    }
}

#[tokio::test]
async fn test_request_gets_its_reply() {
    let bus = Arc::new(MessageBus::new());
    let cancel = CancellationToken::new();
    let server = {
        let bus = Arc::clone(&bus);
        let cancel = cancel.clone();
        tokio::spawn(async move { bus.serve(Arc::new(EchoHandler), cancel).await })
    };

    let client = bus.client();
    let reply = client.send(BackgroundMessage::SubmitJob { session_id: "J1".into() }).await.unwrap();
    assert_eq!(reply, MessageReply::Submitted { session_id: "J1".into() });

    let reply = client.send(BackgroundMessage::ClearJob).await.unwrap();
    assert_eq!(reply, MessageReply::Rejected { reason: "CLEAR_JOB".into() });

    cancel.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_send_after_shutdown_is_an_error_not_a_panic() {
    let bus = Arc::new(MessageBus::new());
    let cancel = CancellationToken::new();
    cancel.cancel();
    bus.serve(Arc::new(EchoHandler), cancel).await.unwrap();

    let err = bus.client().send(BackgroundMessage::GetStatus).await.unwrap_err();
    assert!(matches!(err, CalRelayError::Host(_)));
}

#[tokio::test]
async fn test_bus_serves_once() {
    let bus = MessageBus::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    bus.serve(Arc::new(EchoHandler), cancel.clone()).await.unwrap();

    let err = bus.serve(Arc::new(EchoHandler), cancel).await.unwrap_err();
    assert!(matches!(err, CalRelayError::Internal(_)));
}

#[tokio::test]
async fn test_broadcast_reaches_open_ui_and_is_silent_without_one() {
    let bus = MessageBus::new();
    bus.broadcast(UiMessage::StatusUpdate { job: None });

    let mut ui = bus.subscribe_ui();
    let job = ActiveJob::polling("J1", 1_700_000_000_000);
    bus.broadcast(UiMessage::StatusUpdate { job: Some(job.clone()) });

    assert_eq!(ui.recv().await.unwrap(), UiMessage::StatusUpdate { job: Some(job) });
}
