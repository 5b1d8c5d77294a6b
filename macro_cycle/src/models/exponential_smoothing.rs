//! Exponential smoothing over lag features

use crate::error::{MacroError, Result};
use crate::features::{FeatureRow, FeatureSchema};
use crate::models::{check_training_set, ForecastModel, TrainedForecastModel};
use cycle_math::smoothing::{alpha_grid, exponential_weights};
use tracing::debug;

pub(crate) const NAME: &str = "exponential_smoothing";

/// Number of smoothing parameters tried when alpha is not fixed
const ALPHA_STEPS: usize = 9;

/// Simple exponential smoothing expressed on the lag features of a row.
///
/// The prediction is `sum_k w_k * lag_k` with `w_k` proportional to
/// `alpha * (1 - alpha)^(k - 1)`.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    alpha: Option<f64>,
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Smoothing parameter
    alpha: f64,
    /// Row positions of the lag features
    positions: Vec<usize>,
    /// Weight per lag position
    weights: Vec<f64>,
}

impl ExponentialSmoothing {
    /// Create a new model; `None` tunes alpha on the training rows
    pub fn new(alpha: Option<f64>) -> Result<Self> {
        if let Some(a) = alpha {
            if !(a > 0.0 && a <= 1.0) {
                return Err(MacroError::InvalidParameter(
                    "Alpha must be between 0 and 1".to_string(),
                ));
            }
        }
        Ok(Self { alpha })
    }
}

fn lag_columns(schema: &FeatureSchema) -> (Vec<usize>, Vec<usize>) {
    schema
        .names()
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            name.strip_prefix("lag_")
                .and_then(|k| k.parse::<usize>().ok())
                .map(|k| (i, k))
        })
        .unzip()
}

fn weighted(positions: &[usize], weights: &[f64], row: &FeatureRow) -> f64 {
    positions
        .iter()
        .zip(weights)
        .map(|(&p, w)| w * row.values()[p])
        .sum()
}

impl ForecastModel for ExponentialSmoothing {
    type Trained = TrainedExponentialSmoothing;

    fn train(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Trained> {
        check_training_set(NAME, rows, targets)?;

        let (positions, lags) = lag_columns(rows[0].schema());
        if positions.is_empty() {
            return Err(MacroError::ModelFit(format!(
                "{}: rows carry no lag features",
                NAME
            )));
        }
        let weights_for = |alpha: f64| {
            exponential_weights(&lags, alpha)
                .map_err(|e| MacroError::ModelFit(format!("{}: {}", NAME, e)))
        };

        let alpha = match self.alpha {
            Some(alpha) => alpha,
            None => {
                let mut best: Option<(f64, f64)> = None;
                for alpha in alpha_grid(ALPHA_STEPS) {
                    let weights = weights_for(alpha)?;
                    let sse: f64 = rows
                        .iter()
                        .zip(targets)
                        .map(|(row, y)| (weighted(&positions, &weights, row) - y).powi(2))
                        .sum();
                    if sse.is_finite() && best.map_or(true, |(b, _)| sse < b) {
                        best = Some((sse, alpha));
                    }
                }
                let (_, alpha) = best.ok_or_else(|| {
                    MacroError::ModelFit(format!("{}: no alpha gave a finite error", NAME))
                })?;
                debug!(alpha, "tuned smoothing parameter");
                alpha
            }
        };

        Ok(TrainedExponentialSmoothing {
            alpha,
            weights: weights_for(alpha)?,
            positions,
        })
    }

    fn name(&self) -> &str {
        NAME
    }
}

impl TrainedExponentialSmoothing {
    /// Smoothing parameter in use
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        if self.positions.iter().any(|&p| p >= row.values().len()) {
            return Err(MacroError::ModelFit(format!(
                "{}: row does not match the training schema",
                NAME
            )));
        }
        Ok(weighted(&self.positions, &self.weights, row))
    }

    fn name(&self) -> &str {
        NAME
    }
}
