//! Port interfaces for host capabilities
//!
//! The raw host APIs (`SidePanelApi`, `SidebarApi`, `WindowsApi`,
//! `ActionApi`) are implemented by a host binding. The orchestrator only sees
//! the higher-level `PanelOpener`, `ResultOpener` and `SignInLauncher`,
//! which the compatibility layer builds on top of the raw APIs.

use async_trait::async_trait;
use calrelay_domain::{PanelOpened, Result, WindowId};
use futures::future::BoxFuture;

/// Native side-panel API (`sidePanel.open`)
#[async_trait]
pub trait SidePanelApi: Send + Sync {
    async fn open(&self, window_id: Option<WindowId>) -> Result<()>;
}

/// Native sidebar API (`sidebarAction.open`)
///
/// `open` must dispatch the host call before returning; the returned future
/// only reports the outcome. Hosts that require a user gesture reject calls
/// dispatched after the gesture context has expired.
pub trait SidebarApi: Send + Sync {
    fn open(&self) -> BoxFuture<'static, Result<()>>;
}

/// Window and tab creation
#[async_trait]
pub trait WindowsApi: Send + Sync {
    /// Create a detached popup window showing `url`
    async fn create_popup(&self, url: &str, width: u32, height: u32) -> Result<WindowId>;

    /// Open `url` in a new tab
    async fn open_tab(&self, url: &str) -> Result<()>;
}

/// Toolbar action badge
#[async_trait]
pub trait ActionApi: Send + Sync {
    /// Empty text clears the badge
    async fn set_badge_text(&self, text: &str) -> Result<()>;

    async fn set_badge_color(&self, color: &str) -> Result<()>;
}

/// Opens the extension panel through whichever mechanism the host supports
#[async_trait]
pub trait PanelOpener: Send + Sync {
    async fn open_panel(
        &self,
        window_id: Option<WindowId>,
        session_id: Option<String>,
    ) -> Result<PanelOpened>;
}

/// Shows a processed session in the web app
#[async_trait]
pub trait ResultOpener: Send + Sync {
    async fn open_result(&self, session_id: &str, access_token: &str) -> Result<()>;
}

/// Starts the external sign-in flow
#[async_trait]
pub trait SignInLauncher: Send + Sync {
    async fn launch_sign_in(&self) -> Result<()>;
}
