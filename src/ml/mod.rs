//! Next-day price-direction model: feature extraction, a small trainable
//! classifier, and JSON persistence. Trained by the periodic background
//! job; loosely coupled to the alerting core.

pub mod model;

pub use model::{build_dataset, TrendModel, FEATURE_LAGS};

/// Trait for ML model predictions
pub trait Predictor {
    type Input;
    type Output;

    fn predict(&self, input: &Self::Input) -> anyhow::Result<Self::Output>;
}
