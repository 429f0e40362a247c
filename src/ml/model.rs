use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Predictor;

/// Number of lagged one-step returns fed to the model.
pub const FEATURE_LAGS: usize = 5;

const LEARNING_RATE: f64 = 0.5;
const EPOCHS: usize = 500;

/// Build the training set from a daily close series: for each day with
/// five preceding returns and a following day, the features are the five
/// lagged one-step returns and the label is whether the next close is up.
/// Samples touching a zero close are skipped.
pub fn build_dataset(closes: &[f64]) -> (Vec<[f64; FEATURE_LAGS]>, Vec<bool>) {
    let mut features = Vec::new();
    let mut labels = Vec::new();

    if closes.len() < FEATURE_LAGS + 2 {
        return (features, labels);
    }

    'days: for i in FEATURE_LAGS..closes.len() - 1 {
        let mut sample = [0.0; FEATURE_LAGS];
        for j in 1..=FEATURE_LAGS {
            let prev = closes[i - j - 1];
            if prev == 0.0 {
                continue 'days;
            }
            sample[j - 1] = (closes[i - j] - prev) / prev;
        }
        features.push(sample);
        labels.push(closes[i + 1] > closes[i]);
    }

    (features, labels)
}

/// Logistic-regression classifier over lagged returns, with deterministic
/// zero-initialized full-batch training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendModel {
    weights: [f64; FEATURE_LAGS],
    bias: f64,
    n_samples: usize,
}

impl TrendModel {
    pub fn fit(features: &[[f64; FEATURE_LAGS]], labels: &[bool]) -> Self {
        let mut weights = [0.0; FEATURE_LAGS];
        let mut bias = 0.0;
        let n = features.len().min(labels.len());

        if n > 0 {
            for _ in 0..EPOCHS {
                let mut grad_w = [0.0; FEATURE_LAGS];
                let mut grad_b = 0.0;
                for (x, &up) in features.iter().zip(labels.iter()).take(n) {
                    let predicted = sigmoid(dot(&weights, x) + bias);
                    let error = predicted - if up { 1.0 } else { 0.0 };
                    for (g, xi) in grad_w.iter_mut().zip(x.iter()) {
                        *g += error * xi;
                    }
                    grad_b += error;
                }
                for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                    *w -= LEARNING_RATE * g / n as f64;
                }
                bias -= LEARNING_RATE * grad_b / n as f64;
            }
        }

        Self {
            weights,
            bias,
            n_samples: n,
        }
    }

    /// Probability that the next close is higher.
    pub fn predict_up(&self, features: &[f64; FEATURE_LAGS]) -> f64 {
        sigmoid(dot(&self.weights, features) + self.bias)
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize trend model")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write trend model to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trend model from {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse trend model")
    }
}

impl Predictor for TrendModel {
    type Input = [f64; FEATURE_LAGS];
    type Output = f64;

    fn predict(&self, input: &Self::Input) -> Result<Self::Output> {
        Ok(self.predict_up(input))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(weights: &[f64; FEATURE_LAGS], features: &[f64; FEATURE_LAGS]) -> f64 {
    weights
        .iter()
        .zip(features.iter())
        .map(|(w, x)| w * x)
        .sum()
}
