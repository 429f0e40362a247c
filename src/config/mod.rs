use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub universe: UniverseConfig,
    pub sweep: SweepConfig,
    pub providers: ProviderConfig,
    pub store: StoreConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Optional file with one symbol per line; built-in defaults otherwise.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub batch_size: usize,
    pub symbol_pause_secs: u64,
    pub batch_pause_secs: u64,
    pub wrap_pause_secs: u64,
    pub move_threshold_pct: f64,
    pub feed_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub price_base_url: String,
    pub news_base_url: String,
    pub news_api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub price_rate_limit_per_minute: u32,
    pub news_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub history_days: u32,
    pub max_symbols: usize,
    pub cadence_hours: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        let config = Config {
            universe: UniverseConfig {
                file: env::var("UNIVERSE_FILE").ok().map(PathBuf::from),
            },
            sweep: SweepConfig {
                batch_size: env::var("SWEEP_BATCH_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .context("Invalid SWEEP_BATCH_SIZE value")?,
                symbol_pause_secs: env::var("SWEEP_SYMBOL_PAUSE_SECS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .context("Invalid SWEEP_SYMBOL_PAUSE_SECS value")?,
                batch_pause_secs: env::var("SWEEP_BATCH_PAUSE_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .context("Invalid SWEEP_BATCH_PAUSE_SECS value")?,
                wrap_pause_secs: env::var("SWEEP_WRAP_PAUSE_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("Invalid SWEEP_WRAP_PAUSE_SECS value")?,
                move_threshold_pct: env::var("MOVE_THRESHOLD_PCT")
                    .unwrap_or_else(|_| "1.5".to_string())
                    .parse()
                    .context("Invalid MOVE_THRESHOLD_PCT value")?,
                feed_capacity: env::var("ALERT_FEED_CAPACITY")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .context("Invalid ALERT_FEED_CAPACITY value")?,
            },
            providers: ProviderConfig {
                price_base_url: env::var("PRICE_BASE_URL")
                    .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
                news_base_url: env::var("NEWS_BASE_URL")
                    .unwrap_or_else(|_| "https://newsapi.org/v2/everything".to_string()),
                news_api_key: env::var("NEWS_API_KEY").ok(),
                http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid HTTP_TIMEOUT_SECS value")?,
                price_rate_limit_per_minute: env::var("PRICE_RATE_LIMIT_PER_MINUTE")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("Invalid PRICE_RATE_LIMIT_PER_MINUTE value")?,
                news_page_size: env::var("NEWS_PAGE_SIZE")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("Invalid NEWS_PAGE_SIZE value")?,
            },
            store: StoreConfig {
                url: env::var("WATCH_STORE_URL")
                    .unwrap_or_else(|_| "sqlite:marketpulse.db".to_string()),
            },
            model: ModelConfig {
                path: env::var("TREND_MODEL_PATH")
                    .unwrap_or_else(|_| "trend_model.json".to_string())
                    .into(),
                history_days: env::var("TREND_MODEL_HISTORY_DAYS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("Invalid TREND_MODEL_HISTORY_DAYS value")?,
                max_symbols: env::var("TREND_MODEL_MAX_SYMBOLS")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .context("Invalid TREND_MODEL_MAX_SYMBOLS value")?,
                cadence_hours: env::var("TREND_MODEL_CADENCE_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .context("Invalid TREND_MODEL_CADENCE_HOURS value")?,
            },
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            universe: UniverseConfig { file: None },
            sweep: SweepConfig {
                batch_size: 20,
                symbol_pause_secs: 1,
                batch_pause_secs: 15,
                wrap_pause_secs: 10,
                move_threshold_pct: 1.5,
                feed_capacity: 500,
            },
            providers: ProviderConfig {
                price_base_url: "https://query1.finance.yahoo.com".to_string(),
                news_base_url: "https://newsapi.org/v2/everything".to_string(),
                news_api_key: None,
                http_timeout_secs: 30,
                price_rate_limit_per_minute: 60,
                news_page_size: 5,
            },
            store: StoreConfig {
                url: "sqlite:marketpulse.db".to_string(),
            },
            model: ModelConfig {
                path: PathBuf::from("trend_model.json"),
                history_days: 60,
                max_symbols: 100,
                cadence_hours: 24,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_sweep_cadence() {
        let config = Config::default();
        assert_eq!(config.sweep.batch_size, 20);
        assert_eq!(config.sweep.symbol_pause_secs, 1);
        assert_eq!(config.sweep.batch_pause_secs, 15);
        assert_eq!(config.sweep.wrap_pause_secs, 10);
        assert_eq!(config.sweep.move_threshold_pct, 1.5);
        assert_eq!(config.sweep.feed_capacity, 500);
    }

    #[test]
    fn default_model_job_runs_daily() {
        let config = Config::default();
        assert_eq!(config.model.cadence_hours, 24);
        assert_eq!(config.model.history_days, 60);
    }
}
