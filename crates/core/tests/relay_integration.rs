//! Integration tests for the page-context auth relay

mod support;

use std::sync::Arc;
use std::time::Duration;

use calrelay_core::{AuthRelay, StorageArea};
use calrelay_domain::{BackgroundMessage, RelayConfig, StorageScope};
use serde_json::{json, Value};
use support::{EventLog, MockStorage, RecordingSender};
use tokio_util::sync::CancellationToken;

const KEY: &str = "calrelay-auth-token";

fn token_json(access: &str) -> Value {
    json!(format!(r#"{{"access_token":"{access}","refresh_token":"r","expires_at":1700000000}}"#))
}

fn relay() -> (Arc<MockStorage>, Arc<RecordingSender>, Arc<AuthRelay>) {
    let page = MockStorage::new(StorageScope::Durable, EventLog::default());
    let sender = RecordingSender::new();
    let relay = Arc::new(AuthRelay::new(page.clone(), sender.clone(), RelayConfig::default()));
    (page, sender, relay)
}

#[tokio::test]
async fn test_same_token_read_twice_sends_once() {
    let (page, sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();

    assert!(matches!(relay.check().await, Some(BackgroundMessage::AuthToken { .. })));
    assert_eq!(relay.check().await, None);

    assert_eq!(sender.sent(), vec![BackgroundMessage::AuthToken {
        access_token: "a1".into(),
        refresh_token: "r".into(),
        expires_at: 1_700_000_000,
    }]);
}

#[tokio::test]
async fn test_removed_token_sends_one_sign_out() {
    let (page, sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();
    relay.check().await;

    page.remove(KEY).await.unwrap();
    assert_eq!(relay.check().await, Some(BackgroundMessage::AuthSignedOut));
    assert_eq!(relay.check().await, None);

    assert_eq!(sender.sent().len(), 2);
}

#[tokio::test]
async fn test_absent_token_on_first_load_sends_nothing() {
    let (_page, sender, relay) = relay();
    assert_eq!(relay.check().await, None);
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn test_changed_token_is_sent_again() {
    let (page, sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();
    relay.check().await;
    page.set(KEY, token_json("a2")).await.unwrap();
    relay.check().await;

    let tokens: Vec<String> = sender
        .sent()
        .into_iter()
        .filter_map(|message| match message {
            BackgroundMessage::AuthToken { access_token, .. } => Some(access_token),
            _ => None,
        })
        .collect();
    assert_eq!(tokens, vec!["a1".to_string(), "a2".to_string()]);
}

#[tokio::test]
async fn test_malformed_token_after_send_counts_as_sign_out() {
    let (page, _sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();
    relay.check().await;

    page.set(KEY, json!("{not json")).await.unwrap();
    assert_eq!(relay.check().await, Some(BackgroundMessage::AuthSignedOut));
}

#[tokio::test]
async fn test_failed_send_is_retried() {
    let (page, sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();

    sender.set_failing(true);
    assert_eq!(relay.check().await, None);

    sender.set_failing(false);
    assert!(relay.check().await.is_some());
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test]
async fn test_read_failure_is_swallowed() {
    let (page, sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();
    relay.check().await;

    page.set_fail_reads(true);
    assert_eq!(relay.check().await, None);
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_checks_on_load_timer_and_storage_event() {
    let (page, sender, relay) = relay();
    page.set(KEY, token_json("a1")).await.unwrap();

    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let relay = Arc::clone(&relay);
        let cancel = cancel.clone();
        async move { relay.run(cancel).await }
    });

    // Initial check on page load.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(sender.sent().len(), 1);
    assert_eq!(page.listener_count(), 1);

    // Cross-tab change triggers an immediate check.
    page.remove(KEY).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(sender.sent().last(), Some(&BackgroundMessage::AuthSignedOut));

    // A fresh token is relayed by the next event or tick.
    page.set(KEY, token_json("a3")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(sender.sent().len(), 3);

    cancel.cancel();
    task.await.unwrap();
    assert_eq!(page.listener_count(), 0);
}
