//! CalRelay - headless background process
//!
//! Loads configuration, installs logging, wires the background context and
//! serves messages until Ctrl-C.

use std::path::PathBuf;

use anyhow::Context;
use calrelay_lib::utils::logging::init_tracing;
use calrelay_lib::AppContext;
use tracing::{debug, info};

const DEFAULT_STORAGE_FILE: &str = "calrelay-storage.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing()?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env loaded"),
    }

    let config = calrelay_infra::config::load().context("failed to load configuration")?;
    let storage_path = std::env::var("CALRELAY_STORAGE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_FILE));

    let context = AppContext::headless(config, &storage_path)
        .await
        .context("failed to create application context")?;
    if let Some(job) = context.start().await? {
        info!(session_id = %job.session_id, status = %job.status, "Found stored job");
    }

    info!(storage = %storage_path.display(), "CalRelay running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;

    context.shutdown().await?;
    Ok(())
}
