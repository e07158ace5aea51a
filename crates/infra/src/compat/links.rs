//! Web app links: result pages and sign-in

use std::sync::Arc;

use async_trait::async_trait;
use calrelay_core::{ResultOpener, SignInLauncher, WindowsApi};
use calrelay_domain::{ApiConfig, CalRelayError, Result};
use tracing::{info, instrument};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Opens web app pages in new tabs
pub struct WebAppLinks {
    base: Url,
    windows: Arc<dyn WindowsApi>,
}

impl WebAppLinks {
    pub fn new(config: &ApiConfig, windows: Arc<dyn WindowsApi>) -> Result<Self> {
        let base = Url::parse(&config.web_app_url).map_err(|e| {
            CalRelayError::Config(format!("Invalid web app URL {}: {e}", config.web_app_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(CalRelayError::Config(format!("Web app URL cannot be a base: {base}")));
        }
        Ok(Self { base, windows })
    }

    fn page(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `{web_app_url}/sessions/{id}#access_token={token}`
    ///
    /// The token travels in the fragment so it never reaches server logs.
    pub fn session_url(&self, session_id: &str, access_token: &str) -> Url {
        let mut url = self.page(&["sessions", session_id]);
        let token: String = byte_serialize(access_token.as_bytes()).collect();
        url.set_fragment(Some(&format!("access_token={token}")));
        url
    }

    pub fn login_url(&self) -> Url {
        self.page(&["login"])
    }
}

#[async_trait]
impl ResultOpener for WebAppLinks {
    #[instrument(skip(self, access_token))]
    async fn open_result(&self, session_id: &str, access_token: &str) -> Result<()> {
        let url = self.session_url(session_id, access_token);
        self.windows.open_tab(url.as_str()).await?;
        info!("Opened session result");
        Ok(())
    }
}

#[async_trait]
impl SignInLauncher for WebAppLinks {
    #[instrument(skip(self))]
    async fn launch_sign_in(&self) -> Result<()> {
        self.windows.open_tab(self.login_url().as_str()).await
    }
}
