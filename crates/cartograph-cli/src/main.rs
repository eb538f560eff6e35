//! Cartograph CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cartograph_cli::cli::Cli;
use cartograph_cli::commands;
use cartograph_core::{load_env_files, parse_endpoint, CartographConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_env_files();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::Result<()> {
    let mut config = CartographConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint.as_deref() {
        config = config.with_endpoint(parse_endpoint(endpoint)?);
    }
    commands::execute(cli.command, config).await
}
