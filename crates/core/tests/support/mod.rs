//! Shared test helpers for `calrelay-core` integration tests.
//!
//! Lightweight in-memory mocks for every core port. All mocks that produce
//! observable side effects append to a shared [`EventLog`] so tests can
//! assert ordering across ports.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calrelay_core::{
    ActionApi, HostPorts, MessageSender, Orchestrator, OrchestratorConfig, PanelOpener,
    PollScheduler, ResultOpener, SessionApi, SignInLauncher, StorageArea, StorageListener,
    SubscriptionId, TickFn, TickOutcome, UiBroadcaster,
};
use calrelay_domain::{
    BackgroundMessage, CalRelayError, MessageReply, PanelKind, PanelOpened, PollSession,
    Result as DomainResult, SessionStatus, StorageChange, StorageScope, UiMessage, WindowId,
};
use parking_lot::Mutex;
use serde_json::Value;

/// Ordered record of side effects across mocks
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// In-memory storage area with synchronous listeners
pub struct MockStorage {
    scope: StorageScope,
    data: Mutex<HashMap<String, Value>>,
    listeners: Mutex<Vec<(SubscriptionId, String, StorageListener)>>,
    next_id: AtomicU64,
    fail_reads: Mutex<bool>,
    log: EventLog,
}

impl MockStorage {
    pub fn new(scope: StorageScope, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            scope,
            data: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            fail_reads: Mutex::new(false),
            log,
        })
    }

    /// Makes every `get` fail with a transient storage error.
    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock() = fail;
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn notify(&self, change: StorageChange) {
        let listeners: Vec<StorageListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(_, key, _)| *key == change.key)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&change);
        }
    }
}

#[async_trait]
impl StorageArea for MockStorage {
    fn scope(&self) -> StorageScope {
        self.scope
    }

    async fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        if *self.fail_reads.lock() {
            return Err(CalRelayError::Storage("simulated read failure".into()));
        }
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        let old_value = self.data.lock().insert(key.to_string(), value.clone());
        self.log.push(format!("set:{key}"));
        self.notify(StorageChange { key: key.to_string(), old_value, new_value: Some(value) });
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        let old_value = self.data.lock().remove(key);
        if old_value.is_some() {
            self.log.push(format!("remove:{key}"));
            self.notify(StorageChange { key: key.to_string(), old_value, new_value: None });
        }
        Ok(())
    }

    fn subscribe(&self, key: &str, listener: StorageListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().push((id, key.to_string(), listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _, _)| *existing != id);
        listeners.len() != before
    }
}

/// Scripted sessions API; responses are consumed in order per session id
#[derive(Default)]
pub struct MockSessionApi {
    responses: Mutex<HashMap<String, VecDeque<DomainResult<PollSession>>>>,
    pub fetches: Mutex<Vec<(String, String)>>,
    pub created_texts: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    next_created_id: Mutex<Option<String>>,
}

impl MockSessionApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, id: &str, response: DomainResult<PollSession>) {
        self.responses.lock().entry(id.to_string()).or_default().push_back(response);
    }

    pub fn push_status(&self, id: &str, status: SessionStatus) {
        self.push(id, Ok(session(id, status)));
    }

    pub fn create_returns(&self, id: &str) {
        *self.next_created_id.lock() = Some(id.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }
}

#[async_trait]
impl SessionApi for MockSessionApi {
    async fn fetch_session(&self, access_token: &str, session_id: &str) -> DomainResult<PollSession> {
        self.fetches.lock().push((access_token.to_string(), session_id.to_string()));
        self.responses
            .lock()
            .get_mut(session_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(session(session_id, SessionStatus::Processing)))
    }

    async fn create_text_session(&self, _access_token: &str, text: &str) -> DomainResult<String> {
        self.created_texts.lock().push(text.to_string());
        Ok(self.next_created_id.lock().clone().unwrap_or_else(|| "created".into()))
    }

    async fn upload_file_session(
        &self,
        _access_token: &str,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<String> {
        self.uploads.lock().push((file_name.to_string(), mime_type.to_string(), bytes.len()));
        Ok(self.next_created_id.lock().clone().unwrap_or_else(|| "uploaded".into()))
    }
}

pub fn session(id: &str, status: SessionStatus) -> PollSession {
    PollSession {
        id: id.to_string(),
        status,
        title: None,
        event_ids: None,
        error_message: None,
        created_at: None,
    }
}

/// Scheduler whose loops only tick when the test says so
#[derive(Default)]
pub struct ManualScheduler {
    loops: Mutex<HashMap<String, (TickFn, Duration)>>,
    pub starts: Mutex<Vec<String>>,
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Runs one tick of the loop for `id`; `None` when no loop is running.
    pub async fn tick(&self, id: &str) -> Option<TickOutcome> {
        let tick = self.loops.lock().get(id).map(|(tick, _)| Arc::clone(tick))?;
        let outcome = tick().await;
        if outcome == TickOutcome::Stop {
            self.loops.lock().remove(id);
        }
        Some(outcome)
    }

    pub fn interval(&self, id: &str) -> Option<Duration> {
        self.loops.lock().get(id).map(|(_, interval)| *interval)
    }

    pub fn running(&self) -> Vec<String> {
        self.loops.lock().keys().cloned().collect()
    }
}

impl PollScheduler for ManualScheduler {
    fn start_polling(&self, id: &str, interval: Duration, tick: TickFn) {
        self.starts.lock().push(id.to_string());
        self.loops.lock().insert(id.to_string(), (tick, interval));
    }

    fn stop_polling(&self, id: &str) -> bool {
        self.loops.lock().remove(id).is_some()
    }

    fn stop_all_polling(&self) {
        self.loops.lock().clear();
    }

    fn is_polling(&self, id: &str) -> bool {
        self.loops.lock().contains_key(id)
    }
}

/// Records every host call into the event log
pub struct MockHost {
    log: EventLog,
    pub badges: Mutex<Vec<String>>,
    pub broadcasts: Mutex<Vec<UiMessage>>,
    pub opened_results: Mutex<Vec<(String, String)>>,
    pub sign_ins: Mutex<usize>,
    pub panels: Mutex<Vec<(Option<WindowId>, Option<String>)>>,
    slow_badge: AtomicBool,
}

impl MockHost {
    pub fn new(log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            log,
            badges: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            opened_results: Mutex::new(Vec::new()),
            sign_ins: Mutex::new(0),
            panels: Mutex::new(Vec::new()),
            slow_badge: AtomicBool::new(false),
        })
    }

    /// The next badge update yields to the runtime before completing.
    pub fn slow_next_badge(&self) {
        self.slow_badge.store(true, Ordering::SeqCst);
    }

    pub fn last_badge(&self) -> Option<String> {
        self.badges.lock().last().cloned()
    }

    pub fn last_broadcast(&self) -> Option<UiMessage> {
        self.broadcasts.lock().last().cloned()
    }
}

#[async_trait]
impl ActionApi for MockHost {
    async fn set_badge_text(&self, text: &str) -> DomainResult<()> {
        if self.slow_badge.swap(false, Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        self.log.push("badge");
        self.badges.lock().push(text.to_string());
        Ok(())
    }

    async fn set_badge_color(&self, _color: &str) -> DomainResult<()> {
        Ok(())
    }
}

impl UiBroadcaster for MockHost {
    fn broadcast(&self, message: UiMessage) {
        self.log.push("broadcast");
        self.broadcasts.lock().push(message);
    }
}

#[async_trait]
impl ResultOpener for MockHost {
    async fn open_result(&self, session_id: &str, access_token: &str) -> DomainResult<()> {
        self.opened_results.lock().push((session_id.to_string(), access_token.to_string()));
        Ok(())
    }
}

#[async_trait]
impl SignInLauncher for MockHost {
    async fn launch_sign_in(&self) -> DomainResult<()> {
        *self.sign_ins.lock() += 1;
        Ok(())
    }
}

#[async_trait]
impl PanelOpener for MockHost {
    async fn open_panel(
        &self,
        window_id: Option<WindowId>,
        session_id: Option<String>,
    ) -> DomainResult<PanelOpened> {
        self.panels.lock().push((window_id, session_id));
        Ok(PanelOpened { kind: PanelKind::NativeSidePanel, window_id })
    }
}

/// Fully wired orchestrator over mocks
pub struct Harness {
    pub log: EventLog,
    pub durable: Arc<MockStorage>,
    pub ephemeral: Arc<MockStorage>,
    pub sessions: Arc<MockSessionApi>,
    pub scheduler: Arc<ManualScheduler>,
    pub host: Arc<MockHost>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        let log = EventLog::default();
        let durable = MockStorage::new(StorageScope::Durable, log.clone());
        let ephemeral = MockStorage::new(StorageScope::Ephemeral, log.clone());
        Self::with_storage(log, durable, ephemeral)
    }

    /// Builds a fresh orchestrator over existing storage, as after a restart.
    pub fn with_storage(
        log: EventLog,
        durable: Arc<MockStorage>,
        ephemeral: Arc<MockStorage>,
    ) -> Self {
        let sessions = MockSessionApi::new();
        let scheduler = ManualScheduler::new();
        let host = MockHost::new(log.clone());
        let ports = HostPorts {
            panel: host.clone(),
            action: host.clone(),
            result_opener: host.clone(),
            sign_in: host.clone(),
            ui: host.clone(),
        };
        let orchestrator = Orchestrator::new(
            durable.clone(),
            ephemeral.clone(),
            sessions.clone(),
            scheduler.clone(),
            ports,
            OrchestratorConfig::default(),
        );
        Self { log, durable, ephemeral, sessions, scheduler, host, orchestrator }
    }

    pub fn restart(&self) -> Self {
        Self::with_storage(self.log.clone(), self.durable.clone(), self.ephemeral.clone())
    }

    pub async fn sign_in_as(&self, token: &str) {
        self.orchestrator
            .store_auth(calrelay_domain::AuthState::new(token, "refresh", 4_000_000_000))
            .await
            .unwrap();
    }
}

/// Message sender that records messages and can be told to fail
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<BackgroundMessage>>,
    failing: Mutex<bool>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn sent(&self) -> Vec<BackgroundMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, message: BackgroundMessage) -> DomainResult<MessageReply> {
        if *self.failing.lock() {
            return Err(CalRelayError::Host("receiving end does not exist".into()));
        }
        self.sent.lock().push(message);
        Ok(MessageReply::Ack)
    }
}
