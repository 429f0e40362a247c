//! The engine object: explicitly constructed at startup and passed by
//! reference into everything that needs it. Owns the alert feed, the
//! last-alert map, and the adapter clients; exposes the inbound query
//! surface consumers call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::Config;
use crate::data::{NewsClient, NewsProvider, PriceClient, PriceProvider};
use crate::detector::MoveDetector;
use crate::feed::{AlertFeed, AlertRecord, LastAlertTimes, DEFAULT_QUERY_LIMIT};
use crate::store::WatchStore;
use crate::summary::{SummaryBuilder, TrendRow, TrendingSummary};
use crate::universe::{Symbol, SymbolMatch, Universe};

pub struct Engine {
    universe: Arc<Universe>,
    feed: AlertFeed,
    last_alerts: LastAlertTimes,
    prices: PriceClient,
    news: NewsClient,
    detector: MoveDetector,
    summary: SummaryBuilder,
}

impl Engine {
    pub fn new(
        config: &Config,
        universe: Arc<Universe>,
        price_provider: Arc<dyn PriceProvider>,
        news_provider: Arc<dyn NewsProvider>,
        watches: Arc<WatchStore>,
    ) -> Self {
        let prices = PriceClient::new(price_provider);
        let news = NewsClient::new(news_provider);
        let detector = MoveDetector::new(config.sweep.move_threshold_pct);
        let summary = SummaryBuilder::new(prices.clone(), Arc::clone(&universe), watches);

        Self {
            universe,
            feed: AlertFeed::new(config.sweep.feed_capacity),
            last_alerts: LastAlertTimes::default(),
            prices,
            news,
            detector,
            summary,
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn prices(&self) -> &PriceClient {
        &self.prices
    }

    pub fn news(&self) -> &NewsClient {
        &self.news
    }

    pub fn detector(&self) -> &MoveDetector {
        &self.detector
    }

    /// Record a detected move. Called only from the sweep task; everything
    /// else reads through the accessors below.
    pub fn publish_alert(&self, record: AlertRecord) {
        self.last_alerts
            .record(record.symbol.clone(), record.time);
        self.feed.push_front(record);
    }

    /// Up to `limit` most-recent alerts, newest-first.
    pub fn latest_alerts(&self, limit: Option<usize>) -> Vec<AlertRecord> {
        self.feed.latest(limit.unwrap_or(DEFAULT_QUERY_LIMIT))
    }

    pub fn last_alert_at(&self, symbol: &Symbol) -> Option<DateTime<Utc>> {
        self.last_alerts.get(symbol)
    }

    pub async fn trending_rows(&self) -> TrendingSummary {
        self.summary.trending_rows().await
    }

    pub async fn watchlist_rows(&self, consumer: &str) -> Vec<TrendRow> {
        self.summary.watchlist_rows(consumer).await
    }

    pub fn search_symbols(&self, query: &str) -> Vec<SymbolMatch> {
        self.universe.search(query)
    }

    /// Intraday close series for charting. Fetch failures render as an
    /// empty series, matching the rest of the read surface.
    pub async fn history_series(&self, symbol: &Symbol) -> Vec<f64> {
        match self.prices.intraday_series(symbol).await {
            Ok(series) => series,
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "No history available");
                Vec::new()
            }
        }
    }
}
