//! On-demand summaries: top gainers/losers and per-consumer watchlist
//! views. Stateless — every call recomputes from live provider data, so it
//! stays off the sweep loop's hot path.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::data::PriceClient;
use crate::store::WatchStore;
use crate::universe::{Symbol, Universe};

/// Number of rows in each of the gainers and losers tables.
pub const TOP_ROWS: usize = 10;

/// Number of universe symbols shown to a consumer with no watches.
const WATCHLIST_FALLBACK: usize = 5;

/// Ephemeral per-symbol trend view. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TrendRow {
    pub symbol: Symbol,
    pub name: String,
    pub percent_change: f64,
    pub spark: Vec<f64>,
}

/// Result of a trending computation over the whole universe.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingSummary {
    pub gainers: Vec<TrendRow>,
    pub losers: Vec<TrendRow>,
    pub rows: Vec<TrendRow>,
}

#[derive(Clone)]
pub struct SummaryBuilder {
    prices: PriceClient,
    universe: Arc<Universe>,
    watches: Arc<WatchStore>,
}

impl SummaryBuilder {
    pub fn new(prices: PriceClient, universe: Arc<Universe>, watches: Arc<WatchStore>) -> Self {
        Self {
            prices,
            universe,
            watches,
        }
    }

    /// Compute a trend row for every universe symbol, then rank. O(universe)
    /// provider calls, acceptable because this runs on demand only. A failed
    /// fetch shows up as a zero-change row, not an error.
    pub async fn trending_rows(&self) -> TrendingSummary {
        let mut rows = Vec::with_capacity(self.universe.len());
        for symbol in self.universe.symbols() {
            rows.push(self.trend_row(symbol, true).await);
        }

        let mut gainers = rows.clone();
        gainers.sort_by(|a, b| compare_change(b, a));
        gainers.truncate(TOP_ROWS);

        let mut losers = rows.clone();
        losers.sort_by(compare_change);
        losers.truncate(TOP_ROWS);

        TrendingSummary {
            gainers,
            losers,
            rows,
        }
    }

    /// Trend rows (without sparkline) for the consumer's subscribed
    /// symbols; consumers with no watches see the head of the universe.
    pub async fn watchlist_rows(&self, consumer: &str) -> Vec<TrendRow> {
        let subscribed = match self.watches.symbols_for(consumer).await {
            Ok(symbols) => symbols,
            Err(e) => {
                debug!(consumer, error = %e, "Watchlist lookup failed, using fallback");
                Vec::new()
            }
        };

        let symbols: Vec<Symbol> = if subscribed.is_empty() {
            self.universe
                .symbols()
                .iter()
                .take(WATCHLIST_FALLBACK)
                .cloned()
                .collect()
        } else {
            subscribed
        };

        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            rows.push(self.trend_row(symbol, false).await);
        }
        rows
    }

    async fn trend_row(&self, symbol: &Symbol, with_spark: bool) -> TrendRow {
        let percent_change = match self.prices.daily_change(symbol).await {
            Ok(change) => change,
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "No daily change available");
                0.0
            }
        };
        let spark = if with_spark {
            match self.prices.intraday_series(symbol).await {
                Ok(series) => series,
                Err(e) => {
                    debug!(symbol = %symbol, error = %e, "No intraday series available");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        TrendRow {
            symbol: symbol.clone(),
            name: symbol.as_str().to_string(),
            percent_change,
            spark,
        }
    }
}

fn compare_change(a: &TrendRow, b: &TrendRow) -> Ordering {
    a.percent_change
        .partial_cmp(&b.percent_change)
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::prices::{DailyBar, PriceProvider};
    use crate::data::{DataError, DataResult};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapProvider {
        changes: HashMap<String, f64>,
    }

    impl MapProvider {
        fn new(changes: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                changes: changes
                    .iter()
                    .map(|(s, c)| (s.to_string(), *c))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl PriceProvider for MapProvider {
        async fn daily_bar(&self, symbol: &Symbol) -> DataResult<DailyBar> {
            match self.changes.get(symbol.as_str()) {
                Some(pct) => Ok(DailyBar {
                    open: 100.0,
                    close: 100.0 + pct,
                }),
                None => Err(DataError::NoData {
                    symbol: symbol.to_string(),
                }),
            }
        }

        async fn intraday_closes(&self, _symbol: &Symbol) -> DataResult<Vec<f64>> {
            Ok(vec![100.0, 101.0, 102.0])
        }

        async fn daily_closes(&self, _symbol: &Symbol, _days: u32) -> DataResult<Vec<f64>> {
            Ok(Vec::new())
        }
    }

    async fn builder(changes: &[(&str, f64)], symbols: &[&str]) -> SummaryBuilder {
        let universe = Arc::new(Universe::from_symbols(
            symbols.iter().map(|s| Symbol::new(s)).collect(),
        ));
        let watches = Arc::new(
            WatchStore::connect("sqlite::memory:")
                .await
                .expect("in-memory store"),
        );
        SummaryBuilder::new(PriceClient::new(MapProvider::new(changes)), universe, watches)
    }

    #[tokio::test]
    async fn trending_ranks_gainers_and_losers() {
        let builder = builder(
            &[("AAA", 2.0), ("BBB", -3.0), ("CCC", 0.5), ("DDD", 4.0)],
            &["AAA", "BBB", "CCC", "DDD"],
        )
        .await;
        let summary = builder.trending_rows().await;

        assert_eq!(summary.rows.len(), 4);
        assert_eq!(summary.gainers[0].symbol, Symbol::new("DDD"));
        assert_eq!(summary.gainers[1].symbol, Symbol::new("AAA"));
        assert_eq!(summary.losers[0].symbol, Symbol::new("BBB"));
        // rows preserve universe order
        assert_eq!(summary.rows[0].symbol, Symbol::new("AAA"));
        assert!(!summary.rows[0].spark.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_becomes_zero_change_row() {
        let builder = builder(&[("AAA", 2.0)], &["AAA", "MISSING"]).await;
        let summary = builder.trending_rows().await;
        let missing = &summary.rows[1];
        assert_eq!(missing.symbol, Symbol::new("MISSING"));
        assert_eq!(missing.percent_change, 0.0);
    }

    #[tokio::test]
    async fn watchlist_falls_back_to_universe_head() {
        let builder = builder(
            &[("AAA", 1.0), ("BBB", 1.0)],
            &["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG"],
        )
        .await;
        let rows = builder.watchlist_rows("nobody").await;
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].symbol, Symbol::new("AAA"));
        assert!(rows.iter().all(|r| r.spark.is_empty()));
    }

    #[tokio::test]
    async fn watchlist_uses_subscribed_symbols() {
        let builder = builder(&[("BBB", -2.0)], &["AAA", "BBB", "CCC"]).await;
        builder
            .watches
            .add("alice", &Symbol::new("BBB"))
            .await
            .expect("add watch");
        let rows = builder.watchlist_rows("alice").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, Symbol::new("BBB"));
        assert_eq!(rows[0].percent_change, -2.0);
    }
}
