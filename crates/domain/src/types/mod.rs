//! Domain types and models
//!
//! The stored records, the remote session shape and the message protocol
//! exchanged between the page, background and UI contexts.

pub mod auth;
pub mod job;
pub mod message;
pub mod panel;
pub mod session;
pub mod storage;

pub use auth::AuthState;
pub use job::{ActiveJob, JobStatus};
pub use message::{BackgroundMessage, MessageReply, UiMessage};
pub use panel::{PanelKind, PanelOpened, WindowId};
pub use session::{PollSession, SessionCreated, SessionStatus};
pub use storage::{StorageChange, StorageScope};
