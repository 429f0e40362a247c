use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod data;
mod detector;
mod engine;
mod feed;
mod ml;
mod orchestrator;
mod store;
mod summary;
mod universe;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::load()?;

    // Initialize tracing with structured JSON logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    subscriber.init();

    info!(version = env!("CARGO_PKG_VERSION"), "MarketPulse starting up");

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    cli::run(cli, config).await?;

    info!("MarketPulse completed successfully");
    Ok(())
}
