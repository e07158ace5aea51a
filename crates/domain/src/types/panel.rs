//! Panel surfaces the host can open

use serde::{Deserialize, Serialize};

use crate::impl_status_conversions;

/// Host window identifier.
pub type WindowId = i64;

/// Which panel mechanism the host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    NativeSidePanel,
    NativeSidebar,
    DetachedPopupWindow,
}

impl_status_conversions!(PanelKind {
    NativeSidePanel => "native_side_panel",
    NativeSidebar => "native_sidebar",
    DetachedPopupWindow => "detached_popup_window",
});

/// Outcome of a successful panel open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOpened {
    /// Mechanism that actually showed the panel (may be a fallback)
    pub kind: PanelKind,
    /// Window created for the panel, when one was created
    pub window_id: Option<WindowId>,
}
