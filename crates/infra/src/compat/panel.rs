//! Panel adapter
//!
//! One variant per host mechanism, chosen once from the probe. Every
//! variant hands the requested session to the panel page through the
//! ephemeral `sidebarSessionId` key.
//!
//! The sidebar variant must dispatch its open call before awaiting
//! anything: that host only honours the call inside the user-gesture
//! context, which ends at the first await.

use std::sync::Arc;

use async_trait::async_trait;
use calrelay_core::{PanelOpener, SidePanelApi, SidebarApi, StorageArea, WindowsApi};
use calrelay_domain::constants::SIDEBAR_SESSION_ID_KEY;
use calrelay_domain::{PanelConfig, PanelKind, PanelOpened, Result, WindowId};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::probe::HostApis;

/// Detached window settings, also the sidebar fallback
#[derive(Debug, Clone)]
pub struct PopupSpec {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl From<&PanelConfig> for PopupSpec {
    fn from(config: &PanelConfig) -> Self {
        Self { url: config.page_path.clone(), width: config.popup_width, height: config.popup_height }
    }
}

pub enum PanelAdapter {
    NativeSidePanel {
        api: Arc<dyn SidePanelApi>,
        storage: Arc<dyn StorageArea>,
    },
    NativeSidebar {
        api: Arc<dyn SidebarApi>,
        windows: Arc<dyn WindowsApi>,
        storage: Arc<dyn StorageArea>,
        popup: PopupSpec,
    },
    DetachedPopupWindow {
        windows: Arc<dyn WindowsApi>,
        storage: Arc<dyn StorageArea>,
        popup: PopupSpec,
    },
}

impl PanelAdapter {
    /// Pick the variant for this host. `storage` is the ephemeral area.
    pub fn select(host: &HostApis, storage: Arc<dyn StorageArea>, config: &PanelConfig) -> Self {
        let popup = PopupSpec::from(config);
        let windows = Arc::clone(&host.windows);

        let adapter = match (host.detect_panel_kind(), &host.side_panel, &host.sidebar) {
            (PanelKind::NativeSidePanel, Some(api), _) => {
                Self::NativeSidePanel { api: Arc::clone(api), storage }
            }
            (PanelKind::NativeSidebar, _, Some(api)) => {
                Self::NativeSidebar { api: Arc::clone(api), windows, storage, popup }
            }
            _ => Self::DetachedPopupWindow { windows, storage, popup },
        };
        info!(kind = %adapter.kind(), "Panel adapter selected");
        adapter
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            Self::NativeSidePanel { .. } => PanelKind::NativeSidePanel,
            Self::NativeSidebar { .. } => PanelKind::NativeSidebar,
            Self::DetachedPopupWindow { .. } => PanelKind::DetachedPopupWindow,
        }
    }
}

/// Store the session for the panel page. A failed write still lets the
/// panel open; the page then shows its default view.
async fn hand_over_session(storage: &dyn StorageArea, session_id: Option<&str>) {
    let Some(session_id) = session_id else { return };
    if let Err(err) = storage.set(SIDEBAR_SESSION_ID_KEY, Value::from(session_id)).await {
        warn!(error = %err, "Failed to store panel session id");
    }
}

async fn open_popup(windows: &dyn WindowsApi, popup: &PopupSpec) -> Result<PanelOpened> {
    let window_id = windows.create_popup(&popup.url, popup.width, popup.height).await?;
    Ok(PanelOpened { kind: PanelKind::DetachedPopupWindow, window_id: Some(window_id) })
}

#[async_trait]
impl PanelOpener for PanelAdapter {
    #[instrument(skip(self))]
    async fn open_panel(
        &self,
        window_id: Option<WindowId>,
        session_id: Option<String>,
    ) -> Result<PanelOpened> {
        match self {
            Self::NativeSidePanel { api, storage } => {
                hand_over_session(storage.as_ref(), session_id.as_deref()).await;
                api.open(window_id).await?;
                Ok(PanelOpened { kind: PanelKind::NativeSidePanel, window_id })
            }
            Self::NativeSidebar { api, windows, storage, popup } => {
                let opening = api.open();
                hand_over_session(storage.as_ref(), session_id.as_deref()).await;
                match opening.await {
                    Ok(()) => Ok(PanelOpened { kind: PanelKind::NativeSidebar, window_id }),
                    Err(err) => {
                        warn!(error = %err, "Sidebar open rejected; opening popup window");
                        open_popup(windows.as_ref(), popup).await
                    }
                }
            }
            Self::DetachedPopupWindow { windows, storage, popup } => {
                hand_over_session(storage.as_ref(), session_id.as_deref()).await;
                open_popup(windows.as_ref(), popup).await
            }
        }
    }
}
