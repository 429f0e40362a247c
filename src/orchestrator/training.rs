//! Periodic model-training job: a sibling of the alert sweep that shares
//! the price source but none of its state. Every cycle it rebuilds the
//! next-day direction model from recent daily closes and writes it to
//! disk; a failed cycle logs and waits for the next one.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::clock::Clock;
use crate::config::ModelConfig;
use crate::data::PriceClient;
use crate::ml::{build_dataset, TrendModel, FEATURE_LAGS};
use crate::universe::Universe;

/// Minimum usable close-series length, matching the dataset builder's
/// requirement plus a margin for short trading weeks.
const MIN_HISTORY: usize = 10;

pub struct TrainingJob {
    prices: PriceClient,
    universe: Arc<Universe>,
    clock: Arc<dyn Clock>,
    config: ModelConfig,
}

impl TrainingJob {
    pub fn new(
        prices: PriceClient,
        universe: Arc<Universe>,
        clock: Arc<dyn Clock>,
        config: ModelConfig,
    ) -> Self {
        Self {
            prices,
            universe,
            clock,
            config,
        }
    }

    pub async fn run(self) {
        info!(
            cadence_hours = self.config.cadence_hours,
            "Trend model training job starting"
        );
        loop {
            if let Err(e) = self.train_once().await {
                warn!(error = %e, "Training cycle failed");
            }
            self.clock
                .pause(Duration::from_secs(self.config.cadence_hours * 3600))
                .await;
        }
    }

    /// One training cycle: gather close series for the head of the
    /// universe, build the dataset, fit, persist.
    pub async fn train_once(&self) -> Result<()> {
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for symbol in self.universe.symbols().iter().take(self.config.max_symbols) {
            let closes = match self
                .prices
                .daily_closes(symbol, self.config.history_days)
                .await
            {
                Ok(closes) => closes,
                Err(e) => {
                    debug!(symbol = %symbol, error = %e, "No history for training");
                    continue;
                }
            };
            if closes.len() < MIN_HISTORY {
                continue;
            }
            let (xs, ys) = build_dataset(&closes);
            features.extend(xs);
            labels.extend(ys);
        }

        if features.is_empty() {
            info!("No training data this cycle, keeping previous model");
            return Ok(());
        }

        let model = TrendModel::fit(&features, &labels);
        model
            .save(&self.config.path)
            .context("Failed to persist trend model")?;
        info!(
            samples = model.n_samples(),
            lags = FEATURE_LAGS,
            path = %self.config.path.display(),
            "Trend model trained"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::prices::{DailyBar, PriceProvider};
    use crate::data::{DataError, DataResult};
    use crate::orchestrator::clock::ManualClock;
    use crate::universe::Symbol;
    use async_trait::async_trait;
    use chrono::Utc;

    struct UptrendProvider;

    #[async_trait]
    impl PriceProvider for UptrendProvider {
        async fn daily_bar(&self, symbol: &Symbol) -> DataResult<DailyBar> {
            Err(DataError::NoData {
                symbol: symbol.to_string(),
            })
        }

        async fn intraday_closes(&self, _symbol: &Symbol) -> DataResult<Vec<f64>> {
            Ok(Vec::new())
        }

        async fn daily_closes(&self, _symbol: &Symbol, days: u32) -> DataResult<Vec<f64>> {
            Ok((0..days).map(|i| 100.0 * 1.01f64.powi(i as i32)).collect())
        }
    }

    #[tokio::test]
    async fn train_once_writes_a_loadable_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend_model.json");
        let config = ModelConfig {
            path: path.clone(),
            history_days: 30,
            max_symbols: 2,
            cadence_hours: 24,
        };
        let job = TrainingJob::new(
            PriceClient::new(Arc::new(UptrendProvider)),
            Arc::new(Universe::default()),
            Arc::new(ManualClock::new(Utc::now())),
            config,
        );

        job.train_once().await.unwrap();

        let model = TrendModel::load(&path).unwrap();
        assert!(model.n_samples() > 0);
    }
}
