//! The alert sweep: the background control loop that walks the symbol
//! universe in batches, detects significant daily moves, enriches them
//! with news sentiment, and publishes alerts into the engine's feed.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::clock::Clock;
use crate::config::SweepConfig;
use crate::engine::Engine;
use crate::feed::AlertRecord;
use crate::universe::Symbol;

/// Pacing intervals for the sweep loop.
#[derive(Debug, Clone)]
pub struct SweepPacing {
    pub batch_size: usize,
    pub symbol_pause: Duration,
    pub batch_pause: Duration,
    pub wrap_pause: Duration,
}

impl From<&SweepConfig> for SweepPacing {
    fn from(config: &SweepConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            symbol_pause: Duration::from_secs(config.symbol_pause_secs),
            batch_pause: Duration::from_secs(config.batch_pause_secs),
            wrap_pause: Duration::from_secs(config.wrap_pause_secs),
        }
    }
}

/// Single writer of the alert feed. Runs until the process exits; a
/// failure while evaluating one symbol skips that symbol and nothing else.
pub struct AlertScheduler {
    engine: Arc<Engine>,
    clock: Arc<dyn Clock>,
    pacing: SweepPacing,
    cursor: usize,
}

impl AlertScheduler {
    pub fn new(engine: Arc<Engine>, clock: Arc<dyn Clock>, pacing: SweepPacing) -> Self {
        Self {
            engine,
            clock,
            pacing,
            cursor: 0,
        }
    }

    pub async fn run(mut self) {
        info!(
            universe = self.engine.universe().len(),
            batch_size = self.pacing.batch_size,
            "Alert sweep starting"
        );
        loop {
            self.step().await;
        }
    }

    /// One scheduling step: either process the batch at the cursor, or —
    /// once the cursor has run past the end — wrap around after the
    /// full-universe cooldown.
    pub async fn step(&mut self) {
        let batch: Vec<Symbol> = self
            .engine
            .universe()
            .batch(self.cursor, self.pacing.batch_size)
            .to_vec();

        if batch.is_empty() {
            self.cursor = 0;
            self.clock.pause(self.pacing.wrap_pause).await;
            return;
        }

        for symbol in &batch {
            match self.evaluate(symbol).await {
                Ok(Some(change)) => {
                    info!(symbol = %symbol, change, "Alert published");
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Symbol evaluation failed, skipping");
                }
            }
            self.clock.pause(self.pacing.symbol_pause).await;
        }

        self.cursor += self.pacing.batch_size;
        self.clock.pause(self.pacing.batch_pause).await;
    }

    /// Evaluate one symbol. Returns the percent change when an alert was
    /// published. A price fetch failure is no signal, not an error: the
    /// explicit skip branch the loop's best-effort policy calls for.
    async fn evaluate(&self, symbol: &Symbol) -> Result<Option<f64>> {
        let change = match self.engine.prices().daily_change(symbol).await {
            Ok(change) => change,
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "No price signal this sweep");
                return Ok(None);
            }
        };

        if !self.engine.detector().is_significant(change) {
            return Ok(None);
        }

        let signal = self.engine.news().check_news(symbol.topic()).await;
        let record = AlertRecord::new(symbol.clone(), change, signal, self.clock.now());
        self.engine.publish_alert(record);
        Ok(Some(change))
    }
}
