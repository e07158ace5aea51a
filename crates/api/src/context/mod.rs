//! Application context - dependency injection container
//!
//! Builds the background context from host APIs: storage adapter, panel
//! adapter, web app links, polling adapter, sessions client and message
//! bus, all handed to one [`Orchestrator`]. `start` resumes stored state and
//! spawns the message loop plus the page-side auth relay.

mod handler;
pub mod headless;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use calrelay_core::{
    AuthRelay, HostPorts, MessageHandler, Orchestrator, OrchestratorConfig, StatusView,
    StorageArea, UiBroadcaster,
};
use calrelay_domain::{ActiveJob, Config, Result, StorageScope};
use calrelay_infra::{
    BusClient, HostApis, JsonFileStorageArea, MemoryStorageArea, MessageBus, PanelAdapter,
    SessionsClient, StorageAdapter, TokioPollingAdapter, WebAppLinks,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use handler::TracedHandler;
pub use headless::HeadlessHost;

use crate::utils::logging::error_label;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub instance_id: Uuid,
    pub storage: StorageAdapter,
    /// Page-local storage the web app writes its token to
    pub page_storage: Arc<dyn StorageArea>,
    pub orchestrator: Orchestrator,
    pub scheduler: Arc<TokioPollingAdapter>,
    pub bus: Arc<MessageBus>,
    pub panel: Arc<PanelAdapter>,

    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AppContext {
    /// Wire the background context over the given host APIs.
    ///
    /// # Errors
    /// Returns `CalRelayError::Config` when an API or web app URL is invalid.
    pub fn new(config: Config, host: HostApis, page_storage: Arc<dyn StorageArea>) -> Result<Self> {
        let storage = host.storage();
        let panel = Arc::new(PanelAdapter::select(&host, storage.ephemeral(), &config.panel));
        let links = Arc::new(WebAppLinks::new(&config.api, Arc::clone(&host.windows))?);
        let sessions = Arc::new(SessionsClient::new(&config.api)?);
        let scheduler = Arc::new(TokioPollingAdapter::new());
        let bus = Arc::new(MessageBus::new());

        let ui: Arc<dyn UiBroadcaster> = bus.clone();
        let ports = HostPorts {
            panel: panel.clone(),
            action: Arc::clone(&host.action),
            result_opener: links.clone(),
            sign_in: links,
            ui,
        };
        let orchestrator = Orchestrator::new(
            storage.durable(),
            storage.ephemeral(),
            sessions,
            scheduler.clone(),
            ports,
            OrchestratorConfig::from(&config),
        );

        let instance_id = Uuid::now_v7();
        info!(%instance_id, panel = %panel.kind(), "Application context created");

        Ok(Self {
            config,
            instance_id,
            storage,
            page_storage,
            orchestrator,
            scheduler,
            bus,
            panel,
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Context for the headless binary: durable state in a JSON file,
    /// everything else in memory.
    pub async fn headless(config: Config, storage_path: &Path) -> Result<Self> {
        let file = JsonFileStorageArea::open(storage_path).await?;
        info!(path = %file.path().display(), "Durable storage opened");
        let durable: Arc<dyn StorageArea> = Arc::new(file);
        let page_storage: Arc<dyn StorageArea> =
            Arc::new(MemoryStorageArea::new(StorageScope::Durable));
        Self::new(config, HeadlessHost::apis(durable), page_storage)
    }

    /// Resume stored state and spawn the message loop and the auth relay.
    ///
    /// Returns the job found in storage, if any. A failed storage read is
    /// logged and treated as no job.
    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn start(&self) -> Result<Option<ActiveJob>> {
        let resumed = match self.orchestrator.init().await {
            Ok(job) => job,
            Err(err) => {
                warn!(error_kind = error_label(&err), error = %err, "Could not read stored job");
                None
            }
        };

        let handler: Arc<dyn MessageHandler> =
            Arc::new(TracedHandler::new(Arc::new(self.orchestrator.clone())));
        let bus = Arc::clone(&self.bus);
        let cancel = self.shutdown.child_token();
        let serve = tokio::spawn(async move {
            if let Err(err) = bus.serve(handler, cancel).await {
                warn!(error = %err, "Message bus stopped with an error");
            }
        });

        let relay = AuthRelay::new(
            Arc::clone(&self.page_storage),
            Arc::new(self.bus.client()),
            self.config.relay.clone(),
        );
        let cancel = self.shutdown.child_token();
        let relay = tokio::spawn(async move { relay.run(cancel).await });

        self.tasks.lock().await.extend([serve, relay]);
        info!(resumed = resumed.is_some(), "Background context started");
        Ok(resumed)
    }

    /// Sending side for UI and relay contexts
    pub fn client(&self) -> BusClient {
        self.bus.client()
    }

    /// Open a status view over this context's storage
    pub async fn status_view(&self) -> Result<StatusView> {
        StatusView::open(self.storage.ephemeral(), Arc::new(self.client())).await
    }

    /// Stop the relay, the message loop and every polling loop
    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn shutdown(&self) -> Result<()> {
        info!(active_loops = self.scheduler.active_count(), "Stopping background context");
        self.shutdown.cancel();

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        let joined = tokio::time::timeout(SHUTDOWN_TIMEOUT, join_logged(tasks)).await;
        if joined.is_err() {
            warn!("Background tasks did not stop in time");
        }

        self.scheduler.shutdown(SHUTDOWN_TIMEOUT).await?;
        info!("Background context stopped");
        Ok(())
    }
}

async fn join_logged(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if let Err(err) = task.await {
            warn!(error = %err, "Background task failed");
        }
    }
}
