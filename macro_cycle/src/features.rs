//! Supervised feature construction over aligned series
//!
//! A row for period `t` is built only from values strictly before `t`:
//! lagged values, the rolling mean and standard deviation of the preceding
//! window, and optionally a sine/cosine encoding of the period of year.
//! The label of the row is the value at `t`. Rows whose lags or window would
//! reach before the start of the series are not materialised.

use crate::config::FeatureConfig;
use crate::data::{AlignedSeries, Frequency};
use crate::error::{MacroError, Result};
use chrono::NaiveDate;
use cycle_math::statistics::{rolling_mean, rolling_std};
use serde::Serialize;
use std::f64::consts::PI;
use std::sync::Arc;

/// Ordered feature names shared by every row of a matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Schema implied by a feature configuration
    pub fn from_config(config: &FeatureConfig) -> Self {
        let mut names: Vec<String> = config.lags.iter().map(|k| format!("lag_{}", k)).collect();
        names.push(format!("rolling_mean_{}", config.rolling_window));
        names.push(format!("rolling_std_{}", config.rolling_window));
        if config.seasonal {
            names.push("season_sin".to_string());
            names.push("season_cos".to_string());
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column position of a named feature
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// One model input: a value for every feature in the schema, all finite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    date: NaiveDate,
    values: Vec<f64>,
    #[serde(skip)]
    schema: Arc<FeatureSchema>,
}

impl FeatureRow {
    /// Create a row, checking it against its schema
    pub fn new(date: NaiveDate, schema: Arc<FeatureSchema>, values: Vec<f64>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(MacroError::InvalidParameter(format!(
                "Row for {} has {} values but the schema declares {} features",
                date,
                values.len(),
                schema.len()
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(MacroError::InvalidParameter(format!(
                "Feature '{}' for {} is not finite",
                schema.names[i], date
            )));
        }

        Ok(Self {
            date,
            values,
            schema,
        })
    }

    /// Target date of this row
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }
}

/// Feature rows with their aligned labels, in chronological order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    schema: Arc<FeatureSchema>,
    rows: Vec<FeatureRow>,
    targets: Vec<f64>,
}

impl FeatureMatrix {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds feature rows for training and for recursive forecasting
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    config: FeatureConfig,
    schema: Arc<FeatureSchema>,
}

impl FeatureEngineer {
    /// Create a feature engineer from a validated configuration
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        let schema = Arc::new(FeatureSchema::from_config(&config));
        Ok(Self { config, schema })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn schema(&self) -> Arc<FeatureSchema> {
        Arc::clone(&self.schema)
    }

    /// Periods of history needed before the first row
    pub fn required_history(&self) -> usize {
        self.config.required_history()
    }

    /// Build every materialisable row of an aligned series
    pub fn build(&self, series: &AlignedSeries) -> Result<FeatureMatrix> {
        let values = series.values();
        let dates = series.dates();
        let required = self.required_history();

        if values.len() <= required {
            return Err(MacroError::InsufficientHistory {
                series: series.name().to_string(),
                required: required + 1,
                available: values.len(),
            });
        }

        // Entry `j` covers `values[j..j + window]`, the window preceding `j + window`.
        let window = self.config.rolling_window;
        let means = rolling_mean(values, window)?;
        let stds = rolling_std(values, window)?;

        let mut rows = Vec::with_capacity(values.len() - required);
        let mut targets = Vec::with_capacity(values.len() - required);
        for t in required..values.len() {
            let rolling = (means[t - window], stds[t - window]);
            rows.push(self.row_from_history(
                &values[..t],
                rolling,
                dates[t],
                series.frequency(),
            )?);
            targets.push(values[t]);
        }

        Ok(FeatureMatrix {
            schema: self.schema(),
            rows,
            targets,
        })
    }

    /// Build the input row for the period that follows `history`
    pub fn next_row(
        &self,
        history: &[f64],
        date: NaiveDate,
        frequency: Frequency,
    ) -> Result<FeatureRow> {
        let required = self.required_history();
        if history.len() < required {
            return Err(MacroError::InsufficientHistory {
                series: format!("feature history for {}", date),
                required,
                available: history.len(),
            });
        }
        let window = self.config.rolling_window;
        let tail = &history[history.len() - window..];
        let rolling = match (
            rolling_mean(tail, window)?.first(),
            rolling_std(tail, window)?.first(),
        ) {
            (Some(&m), Some(&s)) => (m, s),
            _ => {
                return Err(MacroError::InsufficientHistory {
                    series: format!("feature history for {}", date),
                    required: window,
                    available: tail.len(),
                })
            }
        };
        self.row_from_history(history, rolling, date, frequency)
    }

    /// `rolling` is the (mean, std) of the window that ends with `history`
    fn row_from_history(
        &self,
        history: &[f64],
        rolling: (f64, f64),
        date: NaiveDate,
        frequency: Frequency,
    ) -> Result<FeatureRow> {
        let n = history.len();
        let mut values = Vec::with_capacity(self.schema.len());

        for &lag in &self.config.lags {
            values.push(history[n - lag]);
        }

        values.push(rolling.0);
        values.push(rolling.1);

        if self.config.seasonal {
            let angle = 2.0 * PI * frequency.period_of_year(date) as f64
                / frequency.periods_per_year() as f64;
            values.push(angle.sin());
            values.push(angle.cos());
        }

        FeatureRow::new(date, self.schema(), values)
    }
}
