//! Ridge linear regression

use crate::error::{MacroError, Result};
use crate::features::FeatureRow;
use crate::models::{check_training_set, ForecastModel, TrainedForecastModel};
use cycle_math::regression::{ridge_regression, RidgeFit};

pub(crate) const NAME: &str = "linear_regression";

/// Linear regression with a small ridge penalty
#[derive(Debug, Clone)]
pub struct LinearRegression {
    ridge: f64,
}

/// Trained linear regression
#[derive(Debug, Clone)]
pub struct TrainedLinearRegression {
    fit: RidgeFit,
}

impl LinearRegression {
    /// Create a new linear regression with penalty `ridge` on standardised coefficients
    pub fn new(ridge: f64) -> Result<Self> {
        if !(ridge.is_finite() && ridge >= 0.0) {
            return Err(MacroError::InvalidParameter(format!(
                "Ridge penalty must be finite and non-negative, got {}",
                ridge
            )));
        }
        Ok(Self { ridge })
    }
}

impl ForecastModel for LinearRegression {
    type Trained = TrainedLinearRegression;

    fn train(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Trained> {
        check_training_set(NAME, rows, targets)?;

        let inputs: Vec<&[f64]> = rows.iter().map(|r| r.values()).collect();
        let fit = ridge_regression(inputs.as_slice(), targets, self.ridge)
            .map_err(|e| MacroError::ModelFit(format!("{}: {}", NAME, e)))?;

        if !fit.intercept.is_finite() || fit.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MacroError::ModelFit(format!(
                "{}: non-finite coefficients",
                NAME
            )));
        }
        Ok(TrainedLinearRegression { fit })
    }

    fn name(&self) -> &str {
        NAME
    }
}

impl TrainedLinearRegression {
    pub fn intercept(&self) -> f64 {
        self.fit.intercept
    }

    /// Coefficients on the original feature scale, zero for excluded features
    pub fn coefficients(&self) -> &[f64] {
        &self.fit.coefficients
    }
}

impl TrainedForecastModel for TrainedLinearRegression {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        self.fit
            .predict(row.values())
            .map_err(|e| MacroError::ModelFit(format!("{}: {}", NAME, e)))
    }

    fn name(&self) -> &str {
        NAME
    }
}
