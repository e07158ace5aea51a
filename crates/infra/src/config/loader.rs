//! Configuration loader
//!
//! ## Environment Variables
//! - `CALRELAY_CONFIG`: explicit config file path
//! - `CALRELAY_API_BASE_URL`, `CALRELAY_WEB_APP_URL`
//! - `CALRELAY_REQUEST_TIMEOUT_SECS`, `CALRELAY_MAX_ATTEMPTS`
//! - `CALRELAY_POLL_INTERVAL_MS`
//! - `CALRELAY_TOKEN_STORAGE_KEY`, `CALRELAY_RELAY_FAST_INTERVAL_MS`,
//!   `CALRELAY_RELAY_WARMUP_TICKS`, `CALRELAY_RELAY_SLOW_INTERVAL_MS`
//! - `CALRELAY_PANEL_PAGE`, `CALRELAY_POPUP_WIDTH`, `CALRELAY_POPUP_HEIGHT`
//!
//! ## File Locations
//! Without `CALRELAY_CONFIG` the loader probes, in order:
//! 1. `./calrelay.{json,toml}` and `./config.{json,toml}`
//! 2. The same names next to the executable
//!
//! No file at all is fine; defaults apply.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use calrelay_domain::{CalRelayError, Config, Result};

const FILE_NAMES: &[&str] = &["calrelay.json", "calrelay.toml", "config.json", "config.toml"];

/// Load the effective configuration
///
/// # Errors
/// Returns `CalRelayError::Config` if the explicit file is missing, a file
/// cannot be parsed, an override has an invalid value, or the result fails
/// [`validate`].
pub fn load() -> Result<Config> {
    let mut config = match std::env::var("CALRELAY_CONFIG").ok().filter(|p| !p.is_empty()) {
        Some(path) => load_from_file(Some(PathBuf::from(path)))?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::debug!("No config file found; using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations and fails when none
/// exists. Format is detected by extension.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalRelayError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CalRelayError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CalRelayError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalRelayError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalRelayError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CalRelayError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Overwrite fields from `CALRELAY_*` variables that are set
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(v) = env_opt("CALRELAY_API_BASE_URL") {
        config.api.base_url = v;
    }
    if let Some(v) = env_opt("CALRELAY_WEB_APP_URL") {
        config.api.web_app_url = v;
    }
    if let Some(v) = env_parse("CALRELAY_REQUEST_TIMEOUT_SECS")? {
        config.api.request_timeout_secs = v;
    }
    if let Some(v) = env_parse("CALRELAY_MAX_ATTEMPTS")? {
        config.api.max_attempts = v;
    }

    if let Some(v) = env_parse("CALRELAY_POLL_INTERVAL_MS")? {
        config.polling.interval_ms = v;
    }

    if let Some(v) = env_opt("CALRELAY_TOKEN_STORAGE_KEY") {
        config.relay.token_storage_key = v;
    }
    if let Some(v) = env_parse("CALRELAY_RELAY_FAST_INTERVAL_MS")? {
        config.relay.fast_interval_ms = v;
    }
    if let Some(v) = env_parse("CALRELAY_RELAY_WARMUP_TICKS")? {
        config.relay.warmup_ticks = v;
    }
    if let Some(v) = env_parse("CALRELAY_RELAY_SLOW_INTERVAL_MS")? {
        config.relay.slow_interval_ms = v;
    }

    if let Some(v) = env_opt("CALRELAY_PANEL_PAGE") {
        config.panel.page_path = v;
    }
    if let Some(v) = env_parse("CALRELAY_POPUP_WIDTH")? {
        config.panel.popup_width = v;
    }
    if let Some(v) = env_parse("CALRELAY_POPUP_HEIGHT")? {
        config.panel.popup_height = v;
    }

    Ok(())
}

/// Reject values that would stall timers or requests
pub fn validate(config: &Config) -> Result<()> {
    let checks = [
        (config.polling.interval_ms == 0, "polling.interval_ms must be positive"),
        (config.relay.fast_interval_ms == 0, "relay.fast_interval_ms must be positive"),
        (config.relay.slow_interval_ms == 0, "relay.slow_interval_ms must be positive"),
        (config.api.request_timeout_secs == 0, "api.request_timeout_secs must be positive"),
        (config.api.max_attempts == 0, "api.max_attempts must be at least 1"),
        (config.relay.token_storage_key.is_empty(), "relay.token_storage_key must not be empty"),
    ];

    match checks.iter().find(|(failed, _)| *failed) {
        Some((_, message)) => Err(CalRelayError::Config((*message).to_string())),
        None => Ok(()),
    }
}

/// Non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CalRelayError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
