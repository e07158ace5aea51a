//! Orchestrator service - job lifecycle and message dispatch
//!
//! Storage is the source of truth. Every mutation follows the same order:
//! write storage, broadcast `STATUS_UPDATE`, refresh the toolbar badge. The
//! job slot lock is held across that whole sequence, so the broadcast and
//! badge always describe the last stored job. No remote call happens while it
//! is held.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calrelay_common::error::ErrorClassification;
use calrelay_common::privacy::fingerprint;
use calrelay_domain::constants::DEFAULT_POLL_INTERVAL_MS;
use calrelay_domain::{
    ActiveJob, AuthState, BackgroundMessage, CalRelayError, Config, JobStatus, MessageReply,
    PanelOpened, PollSession, Result, UiMessage, WindowId,
};
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::state_machine::{apply_poll, badge_for, fail, PollTransition};
use super::validation::{decode_upload, validate_text};
use crate::host::ports::{ActionApi, PanelOpener, ResultOpener, SignInLauncher};
use crate::messaging::ports::{MessageHandler, UiBroadcaster};
use crate::polling::ports::{PollScheduler, TickFn, TickOutcome};
use crate::sessions::ports::SessionApi;
use crate::storage::ports::StorageArea;
use crate::storage::repository::{AuthRepository, JobRepository};

/// Host-facing collaborators of the orchestrator
#[derive(Clone)]
pub struct HostPorts {
    pub panel: Arc<dyn PanelOpener>,
    pub action: Arc<dyn ActionApi>,
    pub result_opener: Arc<dyn ResultOpener>,
    pub sign_in: Arc<dyn SignInLauncher>,
    pub ui: Arc<dyn UiBroadcaster>,
}

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub poll_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS) }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self { poll_interval: Duration::from_millis(config.polling.interval_ms) }
    }
}

enum PollUpdate {
    Session(PollSession),
    Failed(CalRelayError),
}

/// Background orchestrator
///
/// Cheap to clone; clones share the same ports and job slot lock.
#[derive(Clone)]
pub struct Orchestrator {
    jobs: JobRepository,
    auth: AuthRepository,
    sessions: Arc<dyn SessionApi>,
    scheduler: Arc<dyn PollScheduler>,
    host: HostPorts,
    config: OrchestratorConfig,
    job_slot: Arc<Mutex<()>>,
}

impl Orchestrator {
    pub fn new(
        durable: Arc<dyn StorageArea>,
        ephemeral: Arc<dyn StorageArea>,
        sessions: Arc<dyn SessionApi>,
        scheduler: Arc<dyn PollScheduler>,
        host: HostPorts,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            jobs: JobRepository::new(ephemeral),
            auth: AuthRepository::new(durable),
            sessions,
            scheduler,
            host,
            config,
            job_slot: Arc::new(Mutex::new(())),
        }
    }

    /// Rebuilds in-memory state after a (re)start.
    ///
    /// A stored job still in `polling` resumes immediately under its
    /// original session id.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<Option<ActiveJob>> {
        let _slot = self.job_slot.lock().await;
        let job = self.jobs.load().await?;

        match &job {
            Some(job) if job.status == JobStatus::Polling => {
                info!(session_id = %job.session_id, "Resuming stored polling job");
                self.start_loop(&job.session_id);
            }
            Some(job) => {
                debug!(session_id = %job.session_id, status = %job.status, "Stored job is terminal");
            }
            None => debug!("No stored job"),
        }

        self.refresh_badge(job.as_ref()).await;
        Ok(job)
    }

    /// Starts tracking `session_id`, replacing any current job.
    #[instrument(skip(self))]
    pub async fn submit(&self, session_id: &str) -> Result<ActiveJob> {
        if session_id.trim().is_empty() {
            return Err(CalRelayError::InvalidInput("Session id is empty".into()));
        }

        let job = ActiveJob::polling(session_id, chrono::Utc::now().timestamp_millis());
        let _slot = self.job_slot.lock().await;
        if let Ok(Some(previous)) = self.jobs.load().await {
            debug!(previous = %previous.session_id, "Replacing current job");
        }
        self.scheduler.stop_all_polling();
        self.jobs.save(&job).await?;

        info!(session_id, "Job submitted");
        self.publish(Some(&job)).await;
        self.start_loop(session_id);
        Ok(job)
    }

    /// One poll of the remote session.
    ///
    /// Transient storage failures and a missing token skip the tick; remote
    /// failures end the job in `error`.
    #[instrument(skip(self))]
    pub async fn poll_tick(&self, session_id: &str) -> TickOutcome {
        let auth = match self.auth.load().await {
            Ok(Some(auth)) => auth,
            Ok(None) => {
                debug!("Signed out; skipping tick");
                return TickOutcome::Continue;
            }
            Err(err) => {
                warn!(error = %err, "Could not read auth state; retrying next tick");
                return TickOutcome::Continue;
            }
        };

        match self.jobs.load().await {
            Ok(Some(job)) if job.session_id == session_id && job.status == JobStatus::Polling => {}
            Ok(_) => {
                debug!("Job replaced, cleared or finished; stopping loop");
                return TickOutcome::Stop;
            }
            Err(err) => {
                warn!(error = %err, "Could not read job; retrying next tick");
                return TickOutcome::Continue;
            }
        }

        let update = match self.sessions.fetch_session(&auth.access_token, session_id).await {
            Ok(session) => PollUpdate::Session(session),
            Err(err) if err.is_retryable() => {
                warn!(error = %err, "Transient failure while polling; retrying next tick");
                return TickOutcome::Continue;
            }
            Err(err) => {
                warn!(error = %err, severity = %err.severity(), "Poll request failed");
                PollUpdate::Failed(err)
            }
        };

        self.apply_update(session_id, update).await
    }

    async fn apply_update(&self, session_id: &str, update: PollUpdate) -> TickOutcome {
        let _slot = self.job_slot.lock().await;

        let current = match self.jobs.load().await {
            Ok(Some(job)) if job.session_id == session_id && job.status == JobStatus::Polling => job,
            Ok(_) => return TickOutcome::Stop,
            Err(err) => {
                warn!(error = %err, "Could not re-read job; retrying next tick");
                return TickOutcome::Continue;
            }
        };

        let written = match &update {
            PollUpdate::Session(session) => match apply_poll(&current, session) {
                PollTransition::Continue => {
                    debug!(remote_status = %session.status, "Still processing");
                    return TickOutcome::Continue;
                }
                PollTransition::Complete(job) => job,
            },
            PollUpdate::Failed(err) => fail(&current, err.message()),
        };

        if let Err(err) = self.jobs.save(&written).await {
            warn!(error = %err, "Could not persist poll result; retrying next tick");
            return TickOutcome::Continue;
        }

        info!(
            session_id,
            status = %written.status,
            event_count = written.event_count,
            "Job finished"
        );
        self.publish(Some(&written)).await;
        TickOutcome::Stop
    }

    /// Deletes the current job regardless of status and stops its loop.
    #[instrument(skip(self))]
    pub async fn clear_job(&self) -> Result<()> {
        let _slot = self.job_slot.lock().await;
        let previous = self.jobs.load().await.ok().flatten();
        self.jobs.clear().await?;

        match previous {
            Some(job) => {
                self.scheduler.stop_polling(&job.session_id);
                info!(session_id = %job.session_id, "Job cleared");
            }
            None => self.scheduler.stop_all_polling(),
        }

        self.publish(None).await;
        Ok(())
    }

    pub async fn get_status(&self) -> Result<Option<ActiveJob>> {
        self.jobs.load().await
    }

    pub async fn get_auth(&self) -> Result<Option<AuthState>> {
        self.auth.load().await
    }

    /// Persists relayed tokens and resumes a job the sign-out paused.
    #[instrument(skip(self, auth), fields(token = %fingerprint(&auth.access_token)))]
    pub async fn store_auth(&self, auth: AuthState) -> Result<()> {
        self.auth.save(&auth).await?;
        info!(expires_at = auth.expires_at, "Auth state stored");
        self.resume_if_polling().await;
        Ok(())
    }

    /// Clears auth and stops every loop; the stored job is kept.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        self.scheduler.stop_all_polling();
        self.auth.clear().await?;
        info!("Signed out");
        Ok(())
    }

    pub async fn sign_in(&self) -> Result<()> {
        self.host.sign_in.launch_sign_in().await
    }

    #[instrument(skip(self, access_token))]
    pub async fn open_session(&self, session_id: &str, access_token: &str) -> Result<()> {
        self.host.result_opener.open_result(session_id, access_token).await
    }

    #[instrument(skip(self))]
    pub async fn open_panel(
        &self,
        window_id: Option<WindowId>,
        session_id: Option<String>,
    ) -> Result<PanelOpened> {
        let opened = self.host.panel.open_panel(window_id, session_id).await?;
        debug!(kind = ?opened.kind, window_id = ?opened.window_id, "Panel opened");
        Ok(opened)
    }

    /// Creates a text session remotely, then tracks it.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn submit_text(&self, text: &str) -> Result<String> {
        let text = validate_text(text)?;
        let auth = self.require_auth().await?;
        let session_id = self.sessions.create_text_session(&auth.access_token, text).await?;
        self.submit(&session_id).await?;
        Ok(session_id)
    }

    /// Uploads a file session remotely, then tracks it.
    #[instrument(skip(self, data), fields(encoded_len = data.len()))]
    pub async fn submit_file(&self, file_name: &str, mime_type: &str, data: &str) -> Result<String> {
        let bytes = decode_upload(file_name, mime_type, data)?;
        let auth = self.require_auth().await?;
        let session_id = self
            .sessions
            .upload_file_session(&auth.access_token, file_name, mime_type, bytes)
            .await?;
        self.submit(&session_id).await?;
        Ok(session_id)
    }

    pub fn is_polling(&self, session_id: &str) -> bool {
        self.scheduler.is_polling(session_id)
    }

    pub fn stop_all_polling(&self) {
        self.scheduler.stop_all_polling();
    }

    async fn require_auth(&self) -> Result<AuthState> {
        self.auth.load().await?.ok_or_else(|| CalRelayError::Auth("Not signed in".into()))
    }

    async fn resume_if_polling(&self) {
        let _slot = self.job_slot.lock().await;
        match self.jobs.load().await {
            Ok(Some(job))
                if job.status == JobStatus::Polling
                    && !self.scheduler.is_polling(&job.session_id) =>
            {
                info!(session_id = %job.session_id, "Resuming polling after sign-in");
                self.start_loop(&job.session_id);
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Could not read job for resume"),
        }
    }

    fn start_loop(&self, session_id: &str) {
        let orchestrator = self.clone();
        let id = session_id.to_string();
        let tick: TickFn = Arc::new(move || -> BoxFuture<'static, TickOutcome> {
            let orchestrator = orchestrator.clone();
            let id = id.clone();
            Box::pin(async move { orchestrator.poll_tick(&id).await })
        });
        self.scheduler.start_polling(session_id, self.config.poll_interval, tick);
    }

    async fn publish(&self, job: Option<&ActiveJob>) {
        self.host.ui.broadcast(UiMessage::StatusUpdate { job: job.cloned() });
        self.refresh_badge(job).await;
    }

    async fn refresh_badge(&self, job: Option<&ActiveJob>) {
        let badge = badge_for(job);
        if let Err(err) = self.host.action.set_badge_text(&badge.text).await {
            warn!(error = %err, "Could not update badge text");
            return;
        }
        if let Some(color) = badge.color {
            if let Err(err) = self.host.action.set_badge_color(color).await {
                warn!(error = %err, "Could not update badge color");
            }
        }
    }
}

#[async_trait]
impl MessageHandler for Orchestrator {
    #[instrument(skip(self, message), fields(kind = message.kind()))]
    async fn handle(&self, message: BackgroundMessage) -> MessageReply {
        let kind = message.kind();

        let result = match message {
            BackgroundMessage::AuthToken { access_token, refresh_token, expires_at } => self
                .store_auth(AuthState { access_token, refresh_token, expires_at })
                .await
                .map(|()| MessageReply::Ack),
            BackgroundMessage::AuthSignedOut => self.sign_out().await.map(|()| MessageReply::Ack),
            BackgroundMessage::GetAuth => {
                self.get_auth().await.map(|auth| MessageReply::Auth { auth })
            }
            BackgroundMessage::SignIn => self.sign_in().await.map(|()| MessageReply::Ack),
            BackgroundMessage::GetStatus => {
                self.get_status().await.map(|job| MessageReply::Status { job })
            }
            BackgroundMessage::OpenSession { session_id, access_token } => {
                self.open_session(&session_id, &access_token).await.map(|()| MessageReply::Ack)
            }
            BackgroundMessage::ClearJob => self.clear_job().await.map(|()| MessageReply::Ack),
            BackgroundMessage::SubmitJob { session_id } => self
                .submit(&session_id)
                .await
                .map(|job| MessageReply::Submitted { session_id: job.session_id }),
            BackgroundMessage::SubmitText { text } => self
                .submit_text(&text)
                .await
                .map(|session_id| MessageReply::Submitted { session_id }),
            BackgroundMessage::SubmitFile { file_name, mime_type, data } => self
                .submit_file(&file_name, &mime_type, &data)
                .await
                .map(|session_id| MessageReply::Submitted { session_id }),
            BackgroundMessage::OpenPanel { window_id, session_id } => {
                self.open_panel(window_id, session_id).await.map(|_| MessageReply::Ack)
            }
        };

        result.unwrap_or_else(|err| {
            warn!(kind, error = %err, "Message rejected");
            MessageReply::Rejected { reason: err.message().to_string() }
        })
    }
}
