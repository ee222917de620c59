//! Command-line interface definitions.

pub mod check;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Atomic-scanner - real-time YES+NO arbitrage detection for binary markets.
#[derive(Parser, Debug)]
#[command(name = "atomic-scanner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover markets and stream them (default)
    Run(RunArgs),

    /// Validate configuration and credentials without connecting
    Check(ConfigPathArg),
}

impl Cli {
    /// The selected command; `run` with defaults when none is given.
    #[must_use]
    pub fn command_or_default(self) -> Commands {
        self.command.unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file (default: config.toml, or built-in defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ignore the discovery snapshot and rescan the listing
    #[arg(long)]
    pub no_cache: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}
