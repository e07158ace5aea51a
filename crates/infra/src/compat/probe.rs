//! Host capability probe

use std::sync::Arc;

use calrelay_core::{ActionApi, SidePanelApi, SidebarApi, StorageArea, WindowsApi};
use calrelay_domain::PanelKind;

use crate::storage::StorageAdapter;

/// Raw APIs offered by the host; absent capabilities are `None`
#[derive(Clone)]
pub struct HostApis {
    pub side_panel: Option<Arc<dyn SidePanelApi>>,
    pub sidebar: Option<Arc<dyn SidebarApi>>,
    pub windows: Arc<dyn WindowsApi>,
    pub action: Arc<dyn ActionApi>,
    pub durable: Arc<dyn StorageArea>,
    pub ephemeral: Option<Arc<dyn StorageArea>>,
}

impl HostApis {
    /// Panel mechanism to use: native side panel, then native sidebar, then
    /// a detached popup window
    pub fn detect_panel_kind(&self) -> PanelKind {
        if self.side_panel.is_some() {
            PanelKind::NativeSidePanel
        } else if self.sidebar.is_some() {
            PanelKind::NativeSidebar
        } else {
            PanelKind::DetachedPopupWindow
        }
    }

    pub fn storage(&self) -> StorageAdapter {
        StorageAdapter::new(Arc::clone(&self.durable), self.ephemeral.clone())
    }
}
