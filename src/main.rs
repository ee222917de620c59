use std::process::ExitCode;

use atomic_scanner::cli::{check, run, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    // reqwest and tungstenite both pull in rustls; pin the ring provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let result = match Cli::parse().command_or_default() {
        Commands::Run(args) => run::execute(args).await.map(|_| ()),
        Commands::Check(arg) => check::execute(arg.config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
