use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

pub mod commands;

#[derive(Parser)]
#[command(
    name = "marketpulse",
    about = "Intraday move alerts with news-sentiment context",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the alert sweep and model-training loops until interrupted
    Run,

    /// Show top gainers and losers across the universe
    Trending,

    /// Search the symbol universe
    Search {
        /// Substring to match against symbols
        query: String,
    },

    /// Print the recent intraday close series for a symbol
    History {
        symbol: String,
    },

    /// Manage a consumer's watchlist
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },

    /// Train the next-day trend model once and exit
    Train,
}

#[derive(Subcommand)]
pub enum WatchAction {
    /// Subscribe a consumer to a symbol
    Add { consumer: String, symbol: String },
    /// Remove a consumer's subscription
    Remove { consumer: String, symbol: String },
    /// Show a consumer's watchlist with current changes
    List { consumer: String },
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    commands::dispatch(cli.command, config).await
}
