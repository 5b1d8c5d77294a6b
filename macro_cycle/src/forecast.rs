//! Recursive multi-step forecast generation

use crate::data::AlignedSeries;
use crate::error::{MacroError, Result};
use crate::features::FeatureEngineer;
use crate::metrics::EvaluationScore;
use crate::models::{ModelCandidate, TrainedForecastModel};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Number of future periods produced for every series
pub const FORECAST_HORIZON: usize = 12;

/// One forecast value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecast series name
    pub series_name: String,
    /// Number of periods forecasted
    pub horizon: usize,
    /// Model that produced the values
    pub model_name: String,
    /// One point per future period, contiguous and in order
    pub points: Vec<ForecastPoint>,
    /// Holdout score of the model
    pub score: EvaluationScore,
}

impl ForecastResult {
    /// Get the forecasted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Get the forecast dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

/// Produces forecasts by feeding each prediction back as history
#[derive(Debug, Clone)]
pub struct ForecastGenerator {
    engineer: FeatureEngineer,
    horizon: usize,
}

impl ForecastGenerator {
    /// Generator for the standard horizon
    pub fn new(engineer: FeatureEngineer) -> Self {
        Self::with_horizon(engineer, FORECAST_HORIZON)
    }

    pub fn with_horizon(engineer: FeatureEngineer, horizon: usize) -> Self {
        Self { engineer, horizon }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Forecast the periods after the end of `series`.
    ///
    /// Pure in the model and the series: nothing is refitted. A non-finite
    /// step fails the whole forecast with `NoViableModel`.
    pub fn generate(
        &self,
        model: &ModelCandidate,
        score: &EvaluationScore,
        series: &AlignedSeries,
    ) -> Result<ForecastResult> {
        let dates = series.next_dates(self.horizon)?;
        let mut history = series.values().to_vec();
        let mut points = Vec::with_capacity(self.horizon);

        for date in dates {
            let row = self.engineer.next_row(&history, date, series.frequency())?;
            let value = model.predict(&row).map_err(|e| MacroError::NoViableModel {
                series: series.name().to_string(),
                reasons: vec![format!("{} at {}: {}", model.name(), date, e)],
            })?;
            history.push(value);
            points.push(ForecastPoint { date, value });
        }

        debug!(
            series = series.name(),
            model = model.name(),
            horizon = self.horizon,
            "generated forecast"
        );

        Ok(ForecastResult {
            series_name: series.name().to_string(),
            horizon: self.horizon,
            model_name: model.name().to_string(),
            points,
            score: score.clone(),
        })
    }
}
