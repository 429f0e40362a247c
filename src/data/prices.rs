use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::retry::retry_with_backoff;
use super::{DataError, DataResult};
use crate::universe::Symbol;

/// Number of trailing intraday closes kept for sparklines and charts.
pub const INTRADAY_POINTS: usize = 20;

/// Open and close of the most recent one-day trading window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub open: f64,
    pub close: f64,
}

/// Price-history provider keyed by symbol. Supports the latest daily bar,
/// a one-day intraday close series, and a multi-day daily close series.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn daily_bar(&self, symbol: &Symbol) -> DataResult<DailyBar>;
    async fn intraday_closes(&self, symbol: &Symbol) -> DataResult<Vec<f64>>;
    async fn daily_closes(&self, symbol: &Symbol, days: u32) -> DataResult<Vec<f64>>;
}

/// Rate limiter for API calls (token bucket algorithm)
struct RateLimiter {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
    last_refill: DateTime<Utc>,
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_refill: Utc::now(),
        }
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    async fn consume(&mut self) {
        loop {
            if self.try_consume() {
                return;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    }

    fn refill(&mut self) {
        let now = Utc::now();
        let elapsed = (now - self.last_refill).num_milliseconds() as f64 / 1000.0;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }
}

/// Chart API response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Production provider backed by a Yahoo-style chart endpoint.
pub struct ChartApiProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ChartApiProvider {
    pub fn new(base_url: String, timeout_secs: u64, rate_limit_per_minute: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("marketpulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        let per_minute = rate_limit_per_minute.max(1) as f64;
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(per_minute, per_minute / 60.0)));

        Self {
            client,
            base_url,
            rate_limiter,
        }
    }

    async fn fetch_quote(&self, symbol: &Symbol, range: &str, interval: &str) -> DataResult<ChartQuote> {
        self.rate_limiter.lock().await.consume().await;

        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            range,
            interval
        );
        tracing::debug!(symbol = %symbol, range, interval, "Chart API request");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Api {
                status_code,
                message: format!("chart endpoint: {}", error_text),
            });
        }

        let body: ChartResponse = response.json().await?;

        if let Some(err) = body.chart.error {
            return Err(DataError::parse_error(format!(
                "chart endpoint reported: {}",
                err
            )));
        }

        body.chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    results.remove(0).indicators.quote.into_iter().next()
                }
            })
            .ok_or_else(|| DataError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

#[async_trait]
impl PriceProvider for ChartApiProvider {
    async fn daily_bar(&self, symbol: &Symbol) -> DataResult<DailyBar> {
        retry_with_backoff(
            || async {
                let quote = self.fetch_quote(symbol, "1d", "1d").await?;
                let open = quote.open.iter().flatten().next().copied();
                let close = quote.close.iter().flatten().last().copied();
                match (open, close) {
                    (Some(open), Some(close)) => Ok(DailyBar { open, close }),
                    _ => Err(DataError::NoData {
                        symbol: symbol.to_string(),
                    }),
                }
            },
            2,
        )
        .await
    }

    async fn intraday_closes(&self, symbol: &Symbol) -> DataResult<Vec<f64>> {
        retry_with_backoff(
            || async {
                let quote = self.fetch_quote(symbol, "1d", "30m").await?;
                Ok(quote.close.into_iter().flatten().collect())
            },
            2,
        )
        .await
    }

    async fn daily_closes(&self, symbol: &Symbol, days: u32) -> DataResult<Vec<f64>> {
        retry_with_backoff(
            || async {
                let quote = self.fetch_quote(symbol, &format!("{}d", days), "1d").await?;
                Ok(quote.close.into_iter().flatten().collect())
            },
            2,
        )
        .await
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price source adapter: percent-change and series computations over a
/// pluggable provider. Errors are returned, not swallowed; sweep and
/// summary callers decide how to degrade.
#[derive(Clone)]
pub struct PriceClient {
    provider: Arc<dyn PriceProvider>,
}

impl PriceClient {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self { provider }
    }

    /// Percent change over the most recent one-day window,
    /// `(close - open) / open * 100`, rounded to 2 decimals.
    pub async fn daily_change(&self, symbol: &Symbol) -> DataResult<f64> {
        let bar = self.provider.daily_bar(symbol).await?;
        if bar.open <= 0.0 {
            return Err(DataError::validation_error(
                "open",
                "open price must be positive",
            ));
        }
        Ok(round2((bar.close - bar.open) / bar.open * 100.0))
    }

    /// Last 20 intraday closes, oldest-first, rounded to 2 decimals.
    pub async fn intraday_series(&self, symbol: &Symbol) -> DataResult<Vec<f64>> {
        let closes = self.provider.intraday_closes(symbol).await?;
        let start = closes.len().saturating_sub(INTRADAY_POINTS);
        Ok(closes[start..].iter().copied().map(round2).collect())
    }

    /// Daily close series over the last `days` days, oldest-first.
    pub async fn daily_closes(&self, symbol: &Symbol, days: u32) -> DataResult<Vec<f64>> {
        self.provider.daily_closes(symbol, days).await
    }
}
