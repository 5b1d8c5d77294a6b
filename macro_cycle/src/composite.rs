//! Composite Index Builder
//!
//! Each constituent is standardised over its own full aligned history, signed
//! by its polarity and combined by weight on the dates every constituent
//! shares.

use crate::config::CompositeConfig;
use crate::data::{AlignedSeries, Frequency};
use crate::error::{MacroError, Result};
use chrono::NaiveDate;
use cycle_math::statistics::zscores;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Composite index family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Leading,
    Coincident,
    Lagging,
}

impl IndexKind {
    pub const ALL: [IndexKind; 3] = [IndexKind::Leading, IndexKind::Coincident, IndexKind::Lagging];
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Leading => "leading",
            IndexKind::Coincident => "coincident",
            IndexKind::Lagging => "lagging",
        };
        f.write_str(name)
    }
}

/// Direction in which a constituent contributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Positive,
    /// Rises when the cycle weakens (e.g. unemployment, jobless claims)
    Inverse,
}

impl Polarity {
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Inverse => -1.0,
        }
    }
}

/// One weighted member of a composite index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    pub series: String,
    pub weight: f64,
    #[serde(default)]
    pub polarity: Polarity,
}

impl Constituent {
    pub fn new(series: &str, weight: f64, polarity: Polarity) -> Self {
        Self {
            series: series.to_string(),
            weight,
            polarity,
        }
    }
}

/// A built composite index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeIndex {
    pub kind: IndexKind,
    /// Constituent names with their weights, in configuration order
    pub weights: Vec<(String, f64)>,
    /// Composite value per common date, in date order
    pub points: Vec<(NaiveDate, f64)>,
}

impl CompositeIndex {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Composite value on a given date
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |&(d, _)| d)
            .ok()
            .map(|i| self.points[i].1)
    }
}

/// Builds leading, coincident and lagging composites from aligned constituents
#[derive(Debug, Clone)]
pub struct CompositeIndexBuilder {
    config: CompositeConfig,
    min_history: usize,
}

impl CompositeIndexBuilder {
    /// `min_history` is the minimum number of common dates
    pub fn new(config: CompositeConfig, min_history: usize) -> Self {
        Self {
            config,
            min_history,
        }
    }

    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    pub fn frequency(&self) -> Frequency {
        self.config.frequency
    }

    /// Build one composite index from the aligned constituents in `series`.
    ///
    /// Fails with `CompositeIndex` when the weights are invalid, a constituent
    /// is missing, has no variance or a different frequency, or the common
    /// dates number fewer than the minimum history.
    pub fn build(
        &self,
        kind: IndexKind,
        series: &BTreeMap<String, AlignedSeries>,
    ) -> Result<CompositeIndex> {
        self.config.validate_index(kind)?;
        let constituents = self.config.constituents(kind);

        let mut standardised = Vec::with_capacity(constituents.len());
        for c in constituents {
            let aligned = series.get(&c.series).ok_or_else(|| {
                MacroError::composite(kind, format!("constituent '{}' is missing", c.series))
            })?;
            if aligned.frequency() != self.config.frequency {
                return Err(MacroError::composite(
                    kind,
                    format!(
                        "constituent '{}' is {:?}, expected {:?}",
                        c.series,
                        aligned.frequency(),
                        self.config.frequency
                    ),
                ));
            }
            let z = zscores(aligned.values()).map_err(|e| {
                MacroError::composite(kind, format!("constituent '{}': {}", c.series, e))
            })?;
            standardised.push((c, aligned, z));
        }

        let first = match standardised.first() {
            Some((_, aligned, _)) => aligned,
            None => return Err(MacroError::composite(kind, "no constituents configured")),
        };

        let mut points = Vec::new();
        for &date in first.dates() {
            let mut total = 0.0;
            let mut present = true;
            for (c, aligned, z) in &standardised {
                match aligned.dates().binary_search(&date) {
                    Ok(i) => total += c.weight * c.polarity.sign() * z[i],
                    Err(_) => {
                        present = false;
                        break;
                    }
                }
            }
            if present {
                points.push((date, total));
            }
        }

        if points.len() < self.min_history {
            return Err(MacroError::composite(
                kind,
                format!(
                    "constituents share {} dates, need at least {}",
                    points.len(),
                    self.min_history
                ),
            ));
        }

        info!(
            index = %kind,
            constituents = constituents.len(),
            periods = points.len(),
            "built composite index"
        );

        Ok(CompositeIndex {
            kind,
            weights: constituents
                .iter()
                .map(|c| (c.series.clone(), c.weight))
                .collect(),
            points,
        })
    }
}
