use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use super::{Commands, WatchAction};
use crate::config::Config;
use crate::data::{ChartApiProvider, NewsApiProvider, PriceClient};
use crate::engine::Engine;
use crate::orchestrator::{AlertScheduler, Clock, SweepPacing, SystemClock, TrainingJob};
use crate::store::WatchStore;
use crate::universe::{Symbol, Universe};

pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run => run_loops(config).await,
        Commands::Trending => trending(config).await,
        Commands::Search { query } => search(config, &query),
        Commands::History { symbol } => history(config, &symbol).await,
        Commands::Watch { action } => watch(config, action).await,
        Commands::Train => train(config).await,
    }
}

fn price_client(config: &Config) -> PriceClient {
    PriceClient::new(Arc::new(ChartApiProvider::new(
        config.providers.price_base_url.clone(),
        config.providers.http_timeout_secs,
        config.providers.price_rate_limit_per_minute,
    )))
}

async fn build_engine(config: &Config) -> Result<(Arc<Engine>, Arc<Universe>)> {
    let universe = Arc::new(Universe::load(config.universe.file.as_deref()));
    let price_provider = Arc::new(ChartApiProvider::new(
        config.providers.price_base_url.clone(),
        config.providers.http_timeout_secs,
        config.providers.price_rate_limit_per_minute,
    ));
    let news_provider = Arc::new(NewsApiProvider::new(
        config.providers.news_base_url.clone(),
        config.providers.news_api_key.clone(),
        config.providers.http_timeout_secs,
        config.providers.news_page_size,
    ));
    let watches = Arc::new(WatchStore::connect(&config.store.url).await?);
    watches.health_check().await?;

    let engine = Arc::new(Engine::new(
        config,
        Arc::clone(&universe),
        price_provider,
        news_provider,
        watches,
    ));
    Ok((engine, universe))
}

async fn run_loops(config: Config) -> Result<()> {
    let (engine, universe) = build_engine(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let scheduler = AlertScheduler::new(
        Arc::clone(&engine),
        Arc::clone(&clock),
        SweepPacing::from(&config.sweep),
    );
    tokio::spawn(scheduler.run());

    let trainer = TrainingJob::new(
        engine.prices().clone(),
        universe,
        clock,
        config.model.clone(),
    );
    tokio::spawn(trainer.run());

    info!("Background tasks started, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");
    Ok(())
}

async fn trending(config: Config) -> Result<()> {
    let (engine, _) = build_engine(&config).await?;
    let summary = engine.trending_rows().await;

    println!("Top gainers:");
    for row in &summary.gainers {
        println!("  {:<14} {:+.2}%", row.symbol, row.percent_change);
    }
    println!("Top losers:");
    for row in &summary.losers {
        println!("  {:<14} {:+.2}%", row.symbol, row.percent_change);
    }
    Ok(())
}

fn search(config: Config, query: &str) -> Result<()> {
    let universe = Universe::load(config.universe.file.as_deref());
    let matches = universe.search(query);
    if matches.is_empty() {
        println!("No symbols match '{query}'");
        return Ok(());
    }
    for hit in matches {
        println!("{:<14} {}", hit.symbol, hit.name);
    }
    Ok(())
}

async fn history(config: Config, symbol: &str) -> Result<()> {
    let prices = price_client(&config);
    let symbol = Symbol::new(symbol);
    let series = prices
        .intraday_series(&symbol)
        .await
        .with_context(|| format!("No intraday history for {symbol}"))?;
    for close in series {
        println!("{close:.2}");
    }
    Ok(())
}

async fn watch(config: Config, action: WatchAction) -> Result<()> {
    match action {
        WatchAction::Add { consumer, symbol } => {
            let store = WatchStore::connect(&config.store.url).await?;
            let symbol = Symbol::new(&symbol);
            if store.add(&consumer, &symbol).await? {
                println!("Added {symbol} to {consumer}'s watchlist");
            } else {
                println!("{symbol} is already on {consumer}'s watchlist");
            }
        }
        WatchAction::Remove { consumer, symbol } => {
            let store = WatchStore::connect(&config.store.url).await?;
            let symbol = Symbol::new(&symbol);
            if store.remove(&consumer, &symbol).await? {
                println!("Removed {symbol} from {consumer}'s watchlist");
            } else {
                println!("{symbol} was not on {consumer}'s watchlist");
            }
        }
        WatchAction::List { consumer } => {
            let (engine, _) = build_engine(&config).await?;
            for row in engine.watchlist_rows(&consumer).await {
                println!("  {:<14} {:+.2}%", row.symbol, row.percent_change);
            }
        }
    }
    Ok(())
}

async fn train(config: Config) -> Result<()> {
    let universe = Arc::new(Universe::load(config.universe.file.as_deref()));
    let job = TrainingJob::new(
        price_client(&config),
        universe,
        Arc::new(SystemClock),
        config.model.clone(),
    );
    job.train_once().await?;
    println!("Trend model written to {}", config.model.path.display());
    Ok(())
}
