//! Cycle Phase Classifier
//!
//! Turning points are local extrema of the coincident composite over a
//! centred window. Confirmed points alternate between peaks and troughs and
//! opposite points are at least `min_separation` periods apart. The current
//! phase follows from the latest confirmed point; confidence combines the
//! point's magnitude rank with the agreement between coincident and leading
//! slopes.

use crate::composite::CompositeIndex;
use crate::config::CycleConfig;
use crate::error::{MacroError, Result};
use chrono::NaiveDate;
use cycle_math::statistics::{percentile_rank, trend_slope};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Slopes smaller than this carry no direction
const FLAT_SLOPE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurningPointKind {
    Peak,
    Trough,
}

/// A confirmed cycle inflection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurningPoint {
    pub date: NaiveDate,
    pub kind: TurningPointKind,
    /// Composite value at the turning point
    pub value: f64,
    /// Absolute move since the previous turning point (or the series start)
    pub magnitude: f64,
}

/// Business-cycle phase label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CycleLabel {
    Expansion,
    Peak,
    Contraction,
    Trough,
}

impl CycleLabel {
    /// The only label that may follow this one
    pub fn next(&self) -> CycleLabel {
        match self {
            CycleLabel::Expansion => CycleLabel::Peak,
            CycleLabel::Peak => CycleLabel::Contraction,
            CycleLabel::Contraction => CycleLabel::Trough,
            CycleLabel::Trough => CycleLabel::Expansion,
        }
    }

    fn of_turning_point(kind: TurningPointKind) -> Self {
        match kind {
            TurningPointKind::Peak => CycleLabel::Peak,
            TurningPointKind::Trough => CycleLabel::Trough,
        }
    }
}

impl fmt::Display for CycleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Current phase with its confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CyclePhase {
    pub label: CycleLabel,
    pub start: NaiveDate,
    pub confidence: f64,
}

/// A stretch of history spent in one phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseSpan {
    pub label: CycleLabel,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub periods: usize,
}

/// Everything the classifier derives from one composite history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub phase: CyclePhase,
    /// Confirmed turning points in chronological order
    pub turning_points: Vec<TurningPoint>,
    /// Phases between turning points, in cyclic order
    pub history: Vec<PhaseSpan>,
    /// Periods from the current phase start to the latest date, inclusive
    pub current_duration: usize,
    /// Mean length of completed expansions
    pub average_expansion: Option<f64>,
    /// Mean length of completed contractions
    pub average_contraction: Option<f64>,
}

/// Detects turning points and labels the current phase
#[derive(Debug, Clone)]
pub struct CyclePhaseClassifier {
    config: CycleConfig,
}

impl CyclePhaseClassifier {
    pub fn new(config: CycleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Confirmed turning points of a composite, alternating in kind
    pub fn turning_points(&self, index: &CompositeIndex) -> Vec<TurningPoint> {
        let dates = index.dates();
        let values = index.values();
        self.confirmed(&values)
            .into_iter()
            .map(|(i, kind, magnitude)| TurningPoint {
                date: dates[i],
                kind,
                value: values[i],
                magnitude,
            })
            .collect()
    }

    /// Classify the current phase of `coincident`, corroborated by `leading`.
    ///
    /// Without a confirmed turning point the label follows the trailing slope
    /// and the confidence is the configured low default.
    pub fn classify(
        &self,
        coincident: &CompositeIndex,
        leading: Option<&CompositeIndex>,
    ) -> Result<CycleSummary> {
        let dates = coincident.dates();
        let values = coincident.values();
        let n = values.len();
        if n == 0 {
            return Err(MacroError::InsufficientHistory {
                series: format!("{} composite", coincident.kind),
                required: self.config.window,
                available: 0,
            });
        }

        let confirmed = self.confirmed(&values);
        let turning_points: Vec<TurningPoint> = confirmed
            .iter()
            .map(|&(i, kind, magnitude)| TurningPoint {
                date: dates[i],
                kind,
                value: values[i],
                magnitude,
            })
            .collect();
        debug!(
            periods = n,
            turning_points = turning_points.len(),
            "scanned coincident composite"
        );

        let half = self.config.window / 2;
        let (phase, start_index) = match confirmed.last() {
            None => {
                let label = if trailing_slope(&values, self.config.trailing_window) < 0.0 {
                    CycleLabel::Contraction
                } else {
                    CycleLabel::Expansion
                };
                let phase = CyclePhase {
                    label,
                    start: dates[0],
                    confidence: self.config.low_confidence,
                };
                (phase, 0)
            }
            Some(&(i, kind, magnitude)) => {
                let (label, start_index) = if i + 1 + half == n {
                    (CycleLabel::of_turning_point(kind), i)
                } else {
                    (CycleLabel::of_turning_point(kind).next(), i + 1)
                };
                let magnitudes: Vec<f64> = confirmed.iter().map(|&(_, _, m)| m).collect();
                let rank = percentile_rank(&magnitudes, magnitude)?;
                let agreement = self.agreement(coincident, leading);
                let w = self.config.magnitude_weight;
                let confidence = (w * rank + (1.0 - w) * agreement).clamp(0.0, 1.0);
                let phase = CyclePhase {
                    label,
                    start: dates[start_index],
                    confidence,
                };
                (phase, start_index)
            }
        };

        let history = phase_history(&dates, &confirmed);
        let average_expansion = average_completed(&history, CycleLabel::Expansion);
        let average_contraction = average_completed(&history, CycleLabel::Contraction);

        info!(
            phase = %phase.label,
            start = %phase.start,
            confidence = phase.confidence,
            "classified cycle phase"
        );

        Ok(CycleSummary {
            phase,
            turning_points,
            history,
            current_duration: n - start_index,
            average_expansion,
            average_contraction,
        })
    }

    /// Candidate extrema filtered into alternating, separated turning points.
    ///
    /// Returns `(position, kind, magnitude)` triples.
    fn confirmed(&self, values: &[f64]) -> Vec<(usize, TurningPointKind, f64)> {
        let half = self.config.window / 2;
        let n = values.len();
        let mut points: Vec<(usize, TurningPointKind)> = Vec::new();
        if n < self.config.window {
            return Vec::new();
        }

        for i in half..n - half {
            let v = values[i];
            let left = &values[i - half..i];
            let right = &values[i + 1..=i + half];
            let kind = if left.iter().all(|&x| x < v) && right.iter().all(|&x| x <= v) {
                TurningPointKind::Peak
            } else if left.iter().all(|&x| x > v) && right.iter().all(|&x| x >= v) {
                TurningPointKind::Trough
            } else {
                continue;
            };

            match points.last_mut() {
                None => points.push((i, kind)),
                Some(last) if last.1 == kind => {
                    let more_extreme = match kind {
                        TurningPointKind::Peak => v > values[last.0],
                        TurningPointKind::Trough => v < values[last.0],
                    };
                    if more_extreme {
                        *last = (i, kind);
                    }
                }
                Some(last) => {
                    if i - last.0 >= self.config.min_separation {
                        points.push((i, kind));
                    }
                }
            }
        }

        let mut previous = values[0];
        points
            .into_iter()
            .map(|(i, kind)| {
                let magnitude = (values[i] - previous).abs();
                previous = values[i];
                (i, kind, magnitude)
            })
            .collect()
    }

    /// 1 when coincident and leading trend the same way over the coincident
    /// trailing dates, 0 when opposite, 0.5 when either is flat or the leading
    /// composite does not cover those dates
    fn agreement(&self, coincident: &CompositeIndex, leading: Option<&CompositeIndex>) -> f64 {
        let leading = match leading {
            Some(index) => index,
            None => return 0.5,
        };
        let from = coincident.len().saturating_sub(self.config.trailing_window);
        let tail = &coincident.points[from..];
        if tail.len() < 2 {
            return 0.5;
        }
        let matched: Option<Vec<f64>> = tail.iter().map(|&(d, _)| leading.value_at(d)).collect();
        let matched = match matched {
            Some(values) => values,
            None => {
                debug!("leading composite does not cover the trailing window");
                return 0.5;
            }
        };

        let own: Vec<f64> = tail.iter().map(|&(_, v)| v).collect();
        let a = trend_slope(&own).unwrap_or(0.0);
        let b = trend_slope(&matched).unwrap_or(0.0);
        if a.abs() < FLAT_SLOPE || b.abs() < FLAT_SLOPE {
            0.5
        } else if a.signum() == b.signum() {
            1.0
        } else {
            0.0
        }
    }
}

fn trailing_slope(values: &[f64], window: usize) -> f64 {
    let tail = &values[values.len().saturating_sub(window)..];
    trend_slope(tail).unwrap_or(0.0)
}

fn phase_history(
    dates: &[NaiveDate],
    confirmed: &[(usize, TurningPointKind, f64)],
) -> Vec<PhaseSpan> {
    let first = match confirmed.first() {
        Some(&(_, kind, _)) => kind,
        None => return Vec::new(),
    };

    let mut spans = Vec::new();
    let mut push = |label: CycleLabel, from: usize, to: usize| {
        if from <= to {
            spans.push(PhaseSpan {
                label,
                start: dates[from],
                end: dates[to],
                periods: to - from + 1,
            });
        }
    };

    let mut label = match first {
        TurningPointKind::Peak => CycleLabel::Expansion,
        TurningPointKind::Trough => CycleLabel::Contraction,
    };
    let mut from = 0usize;
    for &(i, _, _) in confirmed {
        if i > 0 {
            push(label, from, i - 1);
        }
        label = label.next();
        push(label, i, i);
        label = label.next();
        from = i + 1;
    }
    push(label, from, dates.len() - 1);
    spans
}

/// Mean length of spans with `label` bounded by turning points on both sides
fn average_completed(history: &[PhaseSpan], label: CycleLabel) -> Option<f64> {
    let lengths: Vec<usize> = history
        .windows(3)
        .filter(|w| {
            w[0].label.next() == label && w[1].label == label && w[2].label == label.next()
        })
        .map(|w| w[1].periods)
        .collect();
    if lengths.is_empty() {
        None
    } else {
        Some(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64)
    }
}
