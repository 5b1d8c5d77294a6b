//! Candidate regression models over feature rows
//!
//! Every candidate follows the same two-stage contract: a [`ForecastModel`]
//! is an unfitted configuration that trains on feature rows, producing a
//! [`TrainedForecastModel`] that predicts one value per row. The closed
//! [`ModelSpec`] / [`ModelCandidate`] pair wraps the variants so selection
//! and forecasting never need dynamic dispatch.

use crate::error::{MacroError, Result};
use crate::features::FeatureRow;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod exponential_smoothing;
pub mod linear;
pub mod tree_ensemble;

pub use exponential_smoothing::{ExponentialSmoothing, TrainedExponentialSmoothing};
pub use linear::{LinearRegression, TrainedLinearRegression};
pub use tree_ensemble::{TrainedTreeEnsemble, TreeEnsemble};

/// Trained forecast model
pub trait TrainedForecastModel: Debug + Send + Sync {
    /// Predict the label of a single feature row
    fn predict(&self, row: &FeatureRow) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on feature rows
pub trait ForecastModel: Debug + Clone + Send + Sync {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on rows and their labels
    fn train(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Shape check shared by every candidate's `train`
pub(crate) fn check_training_set(name: &str, rows: &[FeatureRow], targets: &[f64]) -> Result<()> {
    if rows.is_empty() {
        return Err(MacroError::ModelFit(format!("{}: no training rows", name)));
    }
    if rows.len() != targets.len() {
        return Err(MacroError::ModelFit(format!(
            "{}: {} rows but {} targets",
            name,
            rows.len(),
            targets.len()
        )));
    }
    if targets.iter().any(|t| !t.is_finite()) {
        return Err(MacroError::ModelFit(format!(
            "{}: training targets must be finite",
            name
        )));
    }
    Ok(())
}

pub(crate) fn finite_prediction(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MacroError::ModelFit(format!(
            "{} produced a non-finite prediction",
            name
        )))
    }
}

/// Configured, unfitted candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Ridge least squares on standardised features
    LinearRegression { ridge: f64 },
    /// Bagged regression trees
    TreeEnsemble {
        trees: usize,
        max_depth: usize,
        min_samples_leaf: usize,
        seed: u64,
    },
    /// Exponentially weighted lag combination; `alpha` is tuned when absent
    ExponentialSmoothing {
        #[serde(default)]
        alpha: Option<f64>,
    },
}

impl ModelSpec {
    pub fn default_linear() -> Self {
        ModelSpec::LinearRegression { ridge: 1e-3 }
    }

    pub fn default_tree_ensemble() -> Self {
        ModelSpec::TreeEnsemble {
            trees: 50,
            max_depth: 4,
            min_samples_leaf: 2,
            seed: 42,
        }
    }

    pub fn default_smoothing() -> Self {
        ModelSpec::ExponentialSmoothing { alpha: None }
    }

    /// Candidate name used in score tables and reports
    pub fn name(&self) -> &'static str {
        match self {
            ModelSpec::LinearRegression { .. } => linear::NAME,
            ModelSpec::TreeEnsemble { .. } => tree_ensemble::NAME,
            ModelSpec::ExponentialSmoothing { .. } => exponential_smoothing::NAME,
        }
    }

    /// Check hyperparameters without fitting
    pub fn validate(&self) -> Result<()> {
        match *self {
            ModelSpec::LinearRegression { ridge } => LinearRegression::new(ridge).map(|_| ()),
            ModelSpec::TreeEnsemble {
                trees,
                max_depth,
                min_samples_leaf,
                seed,
            } => TreeEnsemble::new(trees, max_depth, min_samples_leaf, seed).map(|_| ()),
            ModelSpec::ExponentialSmoothing { alpha } => {
                ExponentialSmoothing::new(alpha).map(|_| ())
            }
        }
    }

    /// Fit the configured variant
    pub fn fit(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<ModelCandidate> {
        let fitted = match *self {
            ModelSpec::LinearRegression { ridge } => {
                ModelCandidate::LinearRegression(LinearRegression::new(ridge)?.train(rows, targets)?)
            }
            ModelSpec::TreeEnsemble {
                trees,
                max_depth,
                min_samples_leaf,
                seed,
            } => ModelCandidate::TreeEnsemble(
                TreeEnsemble::new(trees, max_depth, min_samples_leaf, seed)?
                    .train(rows, targets)?,
            ),
            ModelSpec::ExponentialSmoothing { alpha } => ModelCandidate::ExponentialSmoothing(
                ExponentialSmoothing::new(alpha)?.train(rows, targets)?,
            ),
        };
        Ok(fitted)
    }
}

/// A fitted candidate, ready to predict
#[derive(Debug, Clone)]
pub enum ModelCandidate {
    LinearRegression(TrainedLinearRegression),
    TreeEnsemble(TrainedTreeEnsemble),
    ExponentialSmoothing(TrainedExponentialSmoothing),
}

impl ModelCandidate {
    /// Predict every row, failing on the first non-finite value
    pub fn predict_all(&self, rows: &[FeatureRow]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

impl TrainedForecastModel for ModelCandidate {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let value = match self {
            ModelCandidate::LinearRegression(m) => m.predict(row)?,
            ModelCandidate::TreeEnsemble(m) => m.predict(row)?,
            ModelCandidate::ExponentialSmoothing(m) => m.predict(row)?,
        };
        finite_prediction(self.name(), value)
    }

    fn name(&self) -> &str {
        match self {
            ModelCandidate::LinearRegression(m) => m.name(),
            ModelCandidate::TreeEnsemble(m) => m.name(),
            ModelCandidate::ExponentialSmoothing(m) => m.name(),
        }
    }
}
