//! Host binding for running without a browser
//!
//! Windows, tabs and the badge are logged instead of shown. There is no
//! native panel and no session storage, so the probe selects the popup
//! window and the in-memory ephemeral area.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use calrelay_core::{ActionApi, StorageArea, WindowsApi};
use calrelay_domain::{Result, WindowId};
use calrelay_infra::HostApis;
use tracing::{debug, info};

#[derive(Default)]
pub struct HeadlessHost {
    next_window: AtomicI64,
}

impl HeadlessHost {
    /// Host APIs backed by this binding and the given durable area
    pub fn apis(durable: Arc<dyn StorageArea>) -> HostApis {
        let host = Arc::new(Self::default());
        HostApis {
            side_panel: None,
            sidebar: None,
            windows: host.clone(),
            action: host,
            durable,
            ephemeral: None,
        }
    }
}

#[async_trait]
impl WindowsApi for HeadlessHost {
    async fn create_popup(&self, url: &str, width: u32, height: u32) -> Result<WindowId> {
        let id = self.next_window.fetch_add(1, Ordering::Relaxed) + 1;
        info!(window_id = id, url, width, height, "Popup window requested");
        Ok(id)
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        // The result URL carries the access token in its fragment.
        let page = url.split('#').next().unwrap_or(url);
        info!(url = page, "Tab requested");
        Ok(())
    }
}

#[async_trait]
impl ActionApi for HeadlessHost {
    async fn set_badge_text(&self, text: &str) -> Result<()> {
        debug!(text, "Badge text");
        Ok(())
    }

    async fn set_badge_color(&self, color: &str) -> Result<()> {
        debug!(color, "Badge color");
        Ok(())
    }
}
