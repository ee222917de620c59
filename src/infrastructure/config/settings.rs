//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section has defaults.
//! Secrets never live in the file: they are read from the environment (or a
//! `.env` file loaded by the binary) through [`Config::credentials`].
//!
//! # Example
//!
//! ```no_run
//! use atomic_scanner::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     let credentials = config.credentials()?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use super::logging::LoggingConfig;
use super::pipeline::{DiscoveryConfig, DispatchConfig, InferenceConfig, JournalConfig};
use super::session::{SessionConfig, MAX_BATCH_SIZE};
use crate::adapter::outbound::friction::settings::FrictionConfig;
use crate::adapter::outbound::polymarket::settings::PolymarketConfig;
use crate::error::{ConfigError, Result};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Environment variables of the optional Polymarket API credentials.
pub const POLY_API_ENV: [&str; 3] = ["POLY_API_KEY", "POLY_API_SECRET", "POLY_API_PASSPHRASE"];

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Listing API and market channel endpoints.
    #[serde(default)]
    pub polymarket: PolymarketConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Connection, batching, heartbeat and reconnection.
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    /// Gas and native/USD price feeds.
    #[serde(default)]
    pub friction: FrictionConfig,

    #[serde(default)]
    pub journal: JournalConfig,
}

/// Secrets resolved from the environment.
#[derive(Clone)]
pub struct Credentials {
    /// Key for the native/USD price feed.
    pub price_api_key: String,
    /// All of the optional CLOB API variables are set. The market channel
    /// is public, so they are only reported.
    pub poly_api_present: bool,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("price_api_key", &"<redacted>")
            .field("poly_api_present", &self.poly_api_present)
            .finish()
    }
}

impl Config {
    /// Parse configuration from TOML content and validate it.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise validated defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_PATH`] or defaults when that file is absent.
    #[allow(clippy::result_large_err)]
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        validate_url("ws_url", &self.polymarket.ws_url)?;
        validate_url("api_url", &self.polymarket.api_url)?;
        if !self.polymarket.gamma_api_url.is_empty() {
            validate_url("gamma_api_url", &self.polymarket.gamma_api_url)?;
        }
        validate_url("gas_station_url", &self.friction.gas_station_url)?;
        validate_url("price_url", &self.friction.price_url)?;

        if self.polymarket.max_pages == 0 {
            return Err(invalid("max_pages", "must be greater than 0"));
        }

        let session = &self.session;
        if session.batch_size == 0 || session.batch_size > MAX_BATCH_SIZE {
            return Err(invalid(
                "batch_size",
                format!("must be between 1 and {MAX_BATCH_SIZE}"),
            ));
        }
        if session.heartbeat_timeout_secs == 0 {
            return Err(invalid("heartbeat_timeout_secs", "must be greater than 0"));
        }
        if session.heartbeat_interval_secs <= session.heartbeat_timeout_secs {
            return Err(invalid(
                "heartbeat_interval_secs",
                "must be greater than heartbeat_timeout_secs",
            ));
        }

        session.reconnection.check()?;

        if self.dispatch.inference_queue_capacity == 0 {
            return Err(invalid("inference_queue_capacity", "must be greater than 0"));
        }
        if self.journal.queue_capacity == 0 {
            return Err(invalid("queue_capacity", "must be greater than 0"));
        }

        if self.inference.target_size <= Decimal::ZERO {
            return Err(invalid("target_size", "must be greater than 0"));
        }
        if self.inference.fee_rate < Decimal::ZERO || self.inference.fee_rate >= Decimal::ONE {
            return Err(invalid("fee_rate", "must be in [0, 1)"));
        }

        if self.friction.refresh_secs == 0 {
            return Err(invalid("refresh_secs", "must be greater than 0"));
        }
        if self.friction.price_api_key_env.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "price_api_key_env",
            }
            .into());
        }
        if self.friction.fallback_gas_price_gwei < Decimal::ZERO
            || self.friction.fallback_native_usd < Decimal::ZERO
        {
            return Err(invalid("fallback", "fallback friction values must be >= 0"));
        }

        Ok(())
    }

    /// Resolve secrets from the process environment.
    ///
    /// The price-feed key is mandatory. Polymarket API credentials are
    /// optional; their absence is only logged.
    #[allow(clippy::result_large_err)]
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_from(|name| std::env::var(name).ok())
    }

    /// Resolve secrets through `lookup`.
    #[allow(clippy::result_large_err)]
    pub fn credentials_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let env_name = self.friction.price_api_key_env.as_str();
        let price_api_key = lookup(env_name)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                name: env_name.to_owned(),
            })?;

        let poly_api_present = POLY_API_ENV
            .iter()
            .all(|name| lookup(name).is_some_and(|v| !v.is_empty()));
        if !poly_api_present {
            warn!("Polymarket API credentials not set; running read-only on the public feed");
        }

        Ok(Credentials {
            price_api_key,
            poly_api_present,
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

#[allow(clippy::result_large_err)]
fn validate_url(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    Ok(())
}
