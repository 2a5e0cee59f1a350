//! The `run` subcommand: foreground delivery daemon.

use std::path::Path;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use crate::app::{shutdown_channel, App};
use crate::config::Config;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    config.init_logging();
    info!("cascade starting");

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            trigger.trigger();
        }
    });

    App::run(config, shutdown).await?;

    info!("cascade stopped");
    Ok(())
}
