//! Handler for the `check` command.

use std::path::Path;

use crate::infrastructure::config::settings::{Config, DEFAULT_CONFIG_PATH, POLY_API_ENV};

/// Validate configuration and credentials without connecting.
///
/// Resolves the config file the same way `run` does.
pub fn execute(config_path: Option<&Path>) -> anyhow::Result<()> {
    let shown = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
    println!("Checking configuration: {}", shown.display());
    println!();

    let config = Config::resolve(config_path)?;
    if config_path.is_none() && !shown.exists() {
        println!("✓ No config file, using defaults");
    } else {
        println!("✓ Configuration file is valid");
    }
    println!();
    println!("Summary:");
    println!("  Listing API: {}", config.polymarket.api_url);
    if config.polymarket.gamma_api_url.is_empty() {
        println!("  Volume API: disabled");
    } else {
        println!("  Volume API: {}", config.polymarket.gamma_api_url);
    }
    println!("  Market channel: {}", config.polymarket.ws_url);
    println!(
        "  Heartbeat: ping every {}s, pong within {}s",
        config.session.heartbeat_interval_secs, config.session.heartbeat_timeout_secs
    );
    println!("  Batch size: {}", config.session.batch_size);
    println!("  Target size: {}", config.inference.target_size);
    println!("  Discovery cache: {}", config.discovery.cache_path.display());
    println!();

    let credentials = config.credentials()?;
    println!(
        "✓ Price feed key found ({})",
        config.friction.price_api_key_env
    );
    if credentials.poly_api_present {
        println!("✓ Polymarket API credentials found");
    } else {
        println!("⚠ Polymarket API credentials not set ({})", POLY_API_ENV.join(", "));
        println!("  The market channel is public; running read-only");
    }

    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
