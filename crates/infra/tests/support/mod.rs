//! Recording host doubles for adapter tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use calrelay_core::{ActionApi, SidePanelApi, SidebarApi, StorageArea, WindowsApi};
use calrelay_domain::{CalRelayError, Result, StorageChange, StorageScope, WindowId};
use calrelay_infra::{HostApis, MemoryStorageArea};
use futures::future::BoxFuture;
use parking_lot::Mutex;

/// Shared, ordered call log
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

pub struct RecordingSidePanel {
    pub log: CallLog,
}

#[async_trait]
impl SidePanelApi for RecordingSidePanel {
    async fn open(&self, window_id: Option<WindowId>) -> Result<()> {
        self.log.push(format!("side_panel.open:{window_id:?}"));
        Ok(())
    }
}

pub struct RecordingSidebar {
    pub log: CallLog,
    pub reject: bool,
}

impl SidebarApi for RecordingSidebar {
    fn open(&self) -> BoxFuture<'static, Result<()>> {
        self.log.push("sidebar.open");
        let log = self.log.clone();
        let reject = self.reject;
        Box::pin(async move {
            tokio::task::yield_now().await;
            if reject {
                log.push("sidebar.rejected");
                Err(CalRelayError::Host("sidebarAction.open may only be called from a user input handler".into()))
            } else {
                log.push("sidebar.opened");
                Ok(())
            }
        })
    }
}

pub struct RecordingWindows {
    pub log: CallLog,
}

#[async_trait]
impl WindowsApi for RecordingWindows {
    async fn create_popup(&self, url: &str, width: u32, height: u32) -> Result<WindowId> {
        self.log.push(format!("windows.create_popup:{url}:{width}x{height}"));
        Ok(42)
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        self.log.push(format!("windows.open_tab:{url}"));
        Ok(())
    }
}

pub struct RecordingAction {
    pub log: CallLog,
}

#[async_trait]
impl ActionApi for RecordingAction {
    async fn set_badge_text(&self, text: &str) -> Result<()> {
        self.log.push(format!("badge.text:{text}"));
        Ok(())
    }

    async fn set_badge_color(&self, color: &str) -> Result<()> {
        self.log.push(format!("badge.color:{color}"));
        Ok(())
    }
}

/// Which panel capabilities the fake host exposes
#[derive(Debug, Clone, Copy)]
pub enum HostFlavor {
    SidePanel,
    Sidebar { reject: bool },
    PopupOnly,
}

/// Fake host with in-memory storage; every storage write is logged as
/// `set:<key>`
pub fn host(flavor: HostFlavor, log: &CallLog) -> (HostApis, Arc<dyn StorageArea>) {
    let ephemeral: Arc<dyn StorageArea> = Arc::new(MemoryStorageArea::new(StorageScope::Ephemeral));
    let sink = log.clone();
    ephemeral.subscribe(
        calrelay_domain::constants::SIDEBAR_SESSION_ID_KEY,
        Arc::new(move |change: &StorageChange| sink.push(format!("set:{}", change.key))),
    );

    let (side_panel, sidebar): (Option<Arc<dyn SidePanelApi>>, Option<Arc<dyn SidebarApi>>) =
        match flavor {
            HostFlavor::SidePanel => {
                (Some(Arc::new(RecordingSidePanel { log: log.clone() })), None)
            }
            HostFlavor::Sidebar { reject } => {
                (None, Some(Arc::new(RecordingSidebar { log: log.clone(), reject })))
            }
            HostFlavor::PopupOnly => (None, None),
        };

    let apis = HostApis {
        side_panel,
        sidebar,
        windows: Arc::new(RecordingWindows { log: log.clone() }),
        action: Arc::new(RecordingAction { log: log.clone() }),
        durable: Arc::new(MemoryStorageArea::new(StorageScope::Durable)),
        ephemeral: Some(Arc::clone(&ephemeral)),
    };
    (apis, ephemeral)
}
