//! Tracing setup and structured log helpers

use std::time::Duration;

use calrelay_domain::CalRelayError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// `RUST_LOG` selects the filter (default `info`). `CALRELAY_LOG_FORMAT=json`
/// switches to JSON lines.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("CALRELAY_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init()
    };

    result.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

/// Log the outcome of one background message.
///
/// `kind` is the protocol tag; payloads are never logged.
#[inline]
pub fn log_message_handled(kind: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(kind, duration_ms, "message_handled");
    } else {
        warn!(kind, duration_ms, "message_rejected");
    }
}

/// Stable label for an error, suitable for log fields
#[inline]
pub fn error_label(error: &CalRelayError) -> &'static str {
    match error {
        CalRelayError::Storage(_) => "storage",
        CalRelayError::Config(_) => "config",
        CalRelayError::Host(_) => "host",
        CalRelayError::Network(_) => "network",
        CalRelayError::Auth(_) => "auth",
        CalRelayError::Serialization(_) => "serialization",
        CalRelayError::NotFound(_) => "not_found",
        CalRelayError::InvalidInput(_) => "invalid_input",
        CalRelayError::Internal(_) => "internal",
    }
}
