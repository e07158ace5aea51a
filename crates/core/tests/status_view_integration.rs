//! Integration tests for the UI status view

mod support;

use std::sync::Arc;

use calrelay_core::{StatusView, StorageArea};
use calrelay_domain::constants::ACTIVE_JOB_KEY;
use calrelay_domain::{ActiveJob, BackgroundMessage, JobStatus, StorageScope};
use support::{EventLog, MockStorage, RecordingSender};

fn job_value(id: &str, status: JobStatus) -> serde_json::Value {
    serde_json::to_value(ActiveJob { status, ..ActiveJob::polling(id, 1) }).unwrap()
}

#[tokio::test]
async fn test_open_reads_current_job() {
    let storage = MockStorage::new(StorageScope::Ephemeral, EventLog::default());
    storage.set(ACTIVE_JOB_KEY, job_value("J1", JobStatus::Polling)).await.unwrap();

    let view = StatusView::open(storage.clone(), RecordingSender::new()).await.unwrap();

    assert_eq!(view.current().map(|job| job.session_id), Some("J1".to_string()));
}

#[tokio::test]
async fn test_view_follows_storage_changes() {
    let storage = MockStorage::new(StorageScope::Ephemeral, EventLog::default());
    let view = StatusView::open(storage.clone(), RecordingSender::new()).await.unwrap();
    let mut rx = view.watch();
    assert!(view.current().is_none());

    storage.set(ACTIVE_JOB_KEY, job_value("J1", JobStatus::Processed)).await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_ref().map(|job| job.status), Some(JobStatus::Processed));

    storage.remove(ACTIVE_JOB_KEY).await.unwrap();
    assert!(view.current().is_none());
}

#[tokio::test]
async fn test_open_result_sends_open_then_clear() {
    let storage = MockStorage::new(StorageScope::Ephemeral, EventLog::default());
    storage.set(ACTIVE_JOB_KEY, job_value("J1", JobStatus::Processed)).await.unwrap();
    let sender = RecordingSender::new();
    let view = StatusView::open(storage, sender.clone()).await.unwrap();

    view.open_result("tok").await.unwrap();

    assert_eq!(sender.sent(), vec![
        BackgroundMessage::OpenSession { session_id: "J1".into(), access_token: "tok".into() },
        BackgroundMessage::ClearJob,
    ]);
}

#[tokio::test]
async fn test_commands_fail_softly_when_background_is_gone() {
    let storage = MockStorage::new(StorageScope::Ephemeral, EventLog::default());
    let sender = RecordingSender::new();
    let view = StatusView::open(storage, sender.clone()).await.unwrap();

    sender.set_failing(true);
    assert!(view.dismiss().await.is_err());
    assert!(view.sign_in().await.is_err());
}

#[tokio::test]
async fn test_drop_unsubscribes() {
    let storage = MockStorage::new(StorageScope::Ephemeral, EventLog::default());
    let view = StatusView::open(Arc::clone(&storage) as Arc<dyn StorageArea>, RecordingSender::new())
        .await
        .unwrap();
    assert_eq!(storage.listener_count(), 1);

    drop(view);
    assert_eq!(storage.listener_count(), 0);
}
