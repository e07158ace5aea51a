//! # CalRelay Core
//!
//! Pure orchestration logic - no host or network code.
//!
//! This crate contains:
//! - Port interfaces (traits) for every host facility: storage areas, panel
//!   and window APIs, the toolbar action, the polling timer, the remote
//!   sessions API and the message channel
//! - The background orchestrator and its poll state machine
//! - The page-context auth relay
//! - The UI status view
//!
//! ## Architecture Principles
//! - Only depends on `calrelay-common` and `calrelay-domain`
//! - All external dependencies via traits
//! - Storage is the single source of truth; in-memory state is a cache

pub mod host;
pub mod messaging;
pub mod orchestrator;
pub mod polling;
pub mod relay;
pub mod sessions;
pub mod storage;
pub mod ui;

pub use host::ports::{
    ActionApi, PanelOpener, ResultOpener, SidePanelApi, SidebarApi, SignInLauncher, WindowsApi,
};
pub use messaging::ports::{MessageHandler, MessageSender, UiBroadcaster};
pub use orchestrator::{HostPorts, Orchestrator, OrchestratorConfig};
pub use polling::ports::{PollScheduler, TickFn, TickOutcome};
pub use relay::AuthRelay;
pub use sessions::ports::SessionApi;
pub use storage::ports::{StorageArea, StorageListener, SubscriptionId};
pub use storage::repository::{AuthRepository, JobRepository};
pub use ui::StatusView;
