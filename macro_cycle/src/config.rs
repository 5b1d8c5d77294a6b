//! Run configuration
//!
//! Every component receives its settings as an explicit value; nothing is
//! read from process-wide state. The whole tree deserializes from TOML with
//! every field optional.

use crate::composite::{Constituent, IndexKind, Polarity};
use crate::data::Frequency;
use crate::error::{MacroError, Result};
use crate::models::ModelSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Tolerance for the composite weight-sum invariant
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Series Aligner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Frequency forced on series without a per-series override; when unset
    /// each series keeps the native frequency reported by its source
    pub frequency: Option<Frequency>,
    /// Minimum number of aligned periods; shared with the composite builder
    pub min_history: usize,
    /// Per-series frequency overrides
    pub frequencies: BTreeMap<String, Frequency>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            frequency: None,
            min_history: 24,
            frequencies: BTreeMap::new(),
        }
    }
}

impl AlignmentConfig {
    /// Frequency a series is aligned to: its override, then the global
    /// setting, then `native`
    pub fn frequency_for(&self, series: &str, native: Frequency) -> Frequency {
        self.frequencies
            .get(series)
            .copied()
            .or(self.frequency)
            .unwrap_or(native)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_history < 2 {
            return Err(MacroError::InvalidParameter(
                "min_history must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Feature Engineer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Lag offsets, in periods
    pub lags: Vec<usize>,
    /// Length of the rolling mean / std window
    pub rolling_window: usize,
    /// Whether to add sine/cosine period-of-year encodings
    pub seasonal: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 3, 6, 12],
            rolling_window: 12,
            seasonal: true,
        }
    }
}

impl FeatureConfig {
    /// Number of preceding periods a row needs before it can be materialised
    pub fn required_history(&self) -> usize {
        self.lags
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(self.rolling_window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lags.is_empty() {
            return Err(MacroError::InvalidParameter(
                "At least one lag is required".to_string(),
            ));
        }
        if self.lags.contains(&0) {
            return Err(MacroError::InvalidParameter(
                "Lags must be at least 1".to_string(),
            ));
        }
        let mut sorted = self.lags.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.lags.len() {
            return Err(MacroError::InvalidParameter(
                "Lags must not repeat".to_string(),
            ));
        }
        if self.rolling_window < 2 {
            return Err(MacroError::InvalidParameter(
                "Rolling window must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Model Trainer/Selector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Share of the latest feature rows held out for scoring
    pub holdout_fraction: f64,
    /// Lower bound on the holdout size
    pub min_holdout: usize,
    /// Lower bound on the training segment size
    pub min_train: usize,
    /// Candidates in declaration order; order breaks exact ties
    pub candidates: Vec<ModelSpec>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.2,
            min_holdout: 6,
            min_train: 2,
            candidates: vec![
                ModelSpec::default_linear(),
                ModelSpec::default_tree_ensemble(),
                ModelSpec::default_smoothing(),
            ],
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(MacroError::InvalidParameter(format!(
                "holdout_fraction must be in (0, 1), got {}",
                self.holdout_fraction
            )));
        }
        if self.min_holdout == 0 || self.min_train == 0 {
            return Err(MacroError::InvalidParameter(
                "min_holdout and min_train must be positive".to_string(),
            ));
        }
        if self.candidates.is_empty() {
            return Err(MacroError::InvalidParameter(
                "At least one candidate model is required".to_string(),
            ));
        }
        for candidate in &self.candidates {
            candidate.validate()?;
        }
        Ok(())
    }
}

/// Composite Index Builder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Frequency every constituent is aligned to
    pub frequency: Frequency,
    pub leading: Vec<Constituent>,
    pub coincident: Vec<Constituent>,
    pub lagging: Vec<Constituent>,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Monthly,
            leading: vec![
                Constituent::new("T10Y2Y", 0.4, Polarity::Positive),
                Constituent::new("PERMIT", 0.3, Polarity::Positive),
                Constituent::new("ICSA", 0.3, Polarity::Inverse),
            ],
            coincident: vec![
                Constituent::new("PAYEMS", 0.4, Polarity::Positive),
                Constituent::new("INDPRO", 0.3, Polarity::Positive),
                Constituent::new("W875RX1", 0.3, Polarity::Positive),
            ],
            lagging: vec![
                Constituent::new("UNRATE", 0.4, Polarity::Inverse),
                Constituent::new("CPILFESL", 0.3, Polarity::Positive),
                Constituent::new("BUSLOANS", 0.3, Polarity::Positive),
            ],
        }
    }
}

impl CompositeConfig {
    /// Constituents of one index type
    pub fn constituents(&self, kind: IndexKind) -> &[Constituent] {
        match kind {
            IndexKind::Leading => &self.leading,
            IndexKind::Coincident => &self.coincident,
            IndexKind::Lagging => &self.lagging,
        }
    }

    /// Check the weight invariant of one index type
    pub fn validate_index(&self, kind: IndexKind) -> Result<()> {
        let constituents = self.constituents(kind);
        if constituents.is_empty() {
            return Err(MacroError::composite(kind, "no constituents configured"));
        }
        if let Some(c) = constituents
            .iter()
            .find(|c| !(c.weight.is_finite() && c.weight >= 0.0))
        {
            return Err(MacroError::composite(
                kind,
                format!("weight of '{}' must be finite and non-negative", c.series),
            ));
        }
        for (i, c) in constituents.iter().enumerate() {
            if constituents[..i].iter().any(|other| other.series == c.series) {
                return Err(MacroError::composite(
                    kind,
                    format!("constituent '{}' listed twice", c.series),
                ));
            }
        }

        let total: f64 = constituents.iter().map(|c| c.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(MacroError::composite(
                kind,
                format!("weights sum to {}, expected 1.0", total),
            ));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for kind in IndexKind::ALL {
            self.validate_index(kind)?;
        }
        Ok(())
    }
}

/// Cycle Phase Classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Width of the centred extremum window (odd)
    pub window: usize,
    /// Minimum distance, in periods, between opposite turning points
    pub min_separation: usize,
    /// Trailing window for the coincident/leading slope comparison
    pub trailing_window: usize,
    /// Share of confidence taken from the turning-point magnitude rank
    pub magnitude_weight: f64,
    /// Confidence reported when no turning point can be confirmed
    pub low_confidence: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            window: 5,
            min_separation: 6,
            trailing_window: 6,
            magnitude_weight: 0.5,
            low_confidence: 0.2,
        }
    }
}

impl CycleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window < 3 || self.window % 2 == 0 {
            return Err(MacroError::InvalidParameter(format!(
                "Turning-point window must be odd and at least 3, got {}",
                self.window
            )));
        }
        if self.min_separation == 0 {
            return Err(MacroError::InvalidParameter(
                "min_separation must be positive".to_string(),
            ));
        }
        if self.trailing_window < 2 {
            return Err(MacroError::InvalidParameter(
                "trailing_window must be at least 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.magnitude_weight) {
            return Err(MacroError::InvalidParameter(
                "magnitude_weight must be in [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.low_confidence) {
            return Err(MacroError::InvalidParameter(
                "low_confidence must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub alignment: AlignmentConfig,
    pub features: FeatureConfig,
    pub selection: SelectionConfig,
    pub composite: CompositeConfig,
    pub cycle: CycleConfig,
    /// Run the two branches and the per-series pipelines on the rayon pool
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            features: FeatureConfig::default(),
            selection: SelectionConfig::default(),
            composite: CompositeConfig::default(),
            cycle: CycleConfig::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MacroError::Config(e.to_string()))
    }

    /// Check every component's settings.
    ///
    /// Composite weight problems are not fatal here: they are reported per
    /// index during the run so the forecast branch can still complete.
    pub fn validate(&self) -> Result<()> {
        self.alignment.validate()?;
        self.features.validate()?;
        self.selection.validate()?;
        self.cycle.validate()?;
        Ok(())
    }
}
