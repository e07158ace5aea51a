//! Configuration types
//!
//! Every section deserializes with defaults so a partial file is valid.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TOKEN_STORAGE_KEY, RELAY_FAST_INTERVAL_MS,
    RELAY_SLOW_INTERVAL_MS, RELAY_WARMUP_TICKS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub relay: RelayConfig,
    pub panel: PanelConfig,
}

/// Remote processing service and web app endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub web_app_url: String,
    pub request_timeout_secs: u64,
    /// Attempts per request, including the first
    pub max_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            web_app_url: "http://localhost:5173".to_string(),
            request_timeout_secs: 30,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: DEFAULT_POLL_INTERVAL_MS }
    }
}

/// Auth relay cadence and watched page-storage key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub token_storage_key: String,
    pub fast_interval_ms: u64,
    pub warmup_ticks: u32,
    pub slow_interval_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            fast_interval_ms: RELAY_FAST_INTERVAL_MS,
            warmup_ticks: RELAY_WARMUP_TICKS,
            slow_interval_ms: RELAY_SLOW_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub page_path: String,
    pub popup_width: u32,
    pub popup_height: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { page_path: "sidebar.html".to_string(), popup_width: 400, popup_height: 640 }
    }
}
