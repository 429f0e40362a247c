//! Engine query-surface integration: the inbound calls consumers make,
//! wired over deterministic providers.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use marketpulse::config::Config;
use marketpulse::data::prices::{DailyBar, PriceProvider};
use marketpulse::data::{DataError, DataResult, NewsItem, NewsProvider, NewsSignal};
use marketpulse::feed::DEFAULT_QUERY_LIMIT;
use marketpulse::store::WatchStore;
use marketpulse::{AlertRecord, Engine, Symbol, Universe};

struct FlakyPrices;

#[async_trait]
impl PriceProvider for FlakyPrices {
    async fn daily_bar(&self, symbol: &Symbol) -> DataResult<DailyBar> {
        Err(DataError::NoData {
            symbol: symbol.to_string(),
        })
    }

    async fn intraday_closes(&self, symbol: &Symbol) -> DataResult<Vec<f64>> {
        if symbol.as_str() == "TCS.NS" {
            Ok(vec![3900.111, 3910.456, 3905.0])
        } else {
            Err(DataError::api_error(503, "unavailable"))
        }
    }

    async fn daily_closes(&self, _symbol: &Symbol, _days: u32) -> DataResult<Vec<f64>> {
        Ok(Vec::new())
    }
}

struct NoNews;

#[async_trait]
impl NewsProvider for NoNews {
    async fn search(&self, _query: &str) -> DataResult<Vec<NewsItem>> {
        Ok(Vec::new())
    }
}

async fn engine() -> Arc<Engine> {
    let config = Config::default();
    let watches = Arc::new(
        WatchStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store"),
    );
    Arc::new(Engine::new(
        &config,
        Arc::new(Universe::default()),
        Arc::new(FlakyPrices),
        Arc::new(NoNews),
        watches,
    ))
}

#[tokio::test]
async fn search_surface_matches_raw_and_stripped_forms() {
    let engine = engine().await;
    assert_eq!(engine.search_symbols("tcs").len(), 1);
    assert_eq!(engine.search_symbols("reliance").len(), 1);
    assert!(engine.search_symbols("zzz").is_empty());
}

#[tokio::test]
async fn history_series_rounds_and_degrades_to_empty() {
    let engine = engine().await;
    let series = engine.history_series(&Symbol::new("TCS.NS")).await;
    assert_eq!(series, vec![3900.11, 3910.46, 3905.0]);

    // Provider failure is not an error on the read surface.
    let series = engine.history_series(&Symbol::new("INFY.NS")).await;
    assert!(series.is_empty());
}

#[tokio::test]
async fn latest_alerts_defaults_to_fifty() {
    let engine = engine().await;
    assert!(engine.latest_alerts(None).is_empty());

    for n in 0..60 {
        engine.publish_alert(AlertRecord::new(
            Symbol::new(&format!("SYM{n}")),
            2.0,
            NewsSignal::none(),
            Utc::now(),
        ));
    }

    let alerts = engine.latest_alerts(None);
    assert_eq!(alerts.len(), DEFAULT_QUERY_LIMIT);
    assert_eq!(alerts[0].symbol, Symbol::new("SYM59"));

    assert_eq!(engine.latest_alerts(Some(5)).len(), 5);
}

#[tokio::test]
async fn watchlist_view_reflects_subscriptions() {
    let config = Config::default();
    let watches = Arc::new(
        WatchStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store"),
    );
    watches
        .add("alice", &Symbol::new("SBIN.NS"))
        .await
        .expect("add watch");

    let engine = Engine::new(
        &config,
        Arc::new(Universe::default()),
        Arc::new(FlakyPrices),
        Arc::new(NoNews),
        watches,
    );

    let rows = engine.watchlist_rows("alice").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].symbol, Symbol::new("SBIN.NS"));
    // Daily change is unavailable from the flaky provider; the row
    // degrades to zero rather than erroring.
    assert_eq!(rows[0].percent_change, 0.0);

    // An unknown consumer falls back to the head of the universe.
    let rows = engine.watchlist_rows("nobody").await;
    assert_eq!(rows.len(), 5);
}
