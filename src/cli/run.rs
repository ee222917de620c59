//! Handler for the `run` command.

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::infrastructure::bootstrap::{self, RunOptions, RunReport};
use crate::infrastructure::config::settings::{Config, DEFAULT_CONFIG_PATH};

/// Execute the run command.
pub async fn execute(args: RunArgs) -> anyhow::Result<RunReport> {
    let mut config = Config::resolve(args.config.as_deref()).with_context(|| {
        let path = args.config.as_deref().map_or(DEFAULT_CONFIG_PATH.into(), |p| p.display().to_string());
        format!("failed to load {path}")
    })?;

    config
        .logging
        .override_with(args.log_level.as_deref(), args.json_logs);
    config.init_logging();

    let credentials = config.credentials().context("missing credentials")?;

    info!(
        ws_url = %config.polymarket.ws_url,
        target_size = %config.inference.target_size,
        use_cache = !args.no_cache,
        "atomic-scanner starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        let _ = shutdown_tx.send(true);
    });

    let report = bootstrap::run(
        &config,
        &credentials,
        RunOptions {
            use_cache: !args.no_cache,
        },
        shutdown_rx,
    )
    .await?;

    info!(
        tokens = report.tokens,
        opportunities = report.opportunities_written,
        "atomic-scanner stopped"
    );
    Ok(report)
}
