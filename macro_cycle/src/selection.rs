//! Model Trainer/Selector
//!
//! Candidates are fitted on the earliest rows, scored on the latest rows and
//! ranked; the winner is refitted on every row before it is returned.

use crate::config::SelectionConfig;
use crate::error::{MacroError, Result};
use crate::features::FeatureMatrix;
use crate::metrics::{evaluate_forecast, EvaluationScore};
use crate::models::{ModelCandidate, ModelSpec, TrainedForecastModel};
use crate::utils::holdout_split;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Grid step for holdout MAE; scores in the same step are ties
const MAE_TIE_TOLERANCE: f64 = 1e-9;

/// A candidate that could not be fitted or scored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    pub candidate: String,
    pub reason: String,
}

/// Outcome of model selection for one series
#[derive(Debug, Clone)]
pub struct ModelSelection {
    /// Winning candidate, refitted on the full feature matrix
    pub model: ModelCandidate,
    /// Holdout score of the winner
    pub score: EvaluationScore,
    /// Scores of every candidate that completed, in declaration order
    pub scores: Vec<EvaluationScore>,
    /// Candidates that failed, in declaration order
    pub failures: Vec<CandidateFailure>,
}

/// Fits, scores and selects among configured candidates
#[derive(Debug, Clone)]
pub struct ModelSelector {
    config: SelectionConfig,
}

impl ModelSelector {
    pub fn new(config: SelectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Select the best candidate for `matrix`.
    ///
    /// Ranking: lowest holdout MAE, then highest directional accuracy, then
    /// declaration order. Fails with `NoViableModel` when no candidate can be
    /// fitted, scored and refitted.
    pub fn select(&self, series: &str, matrix: &FeatureMatrix) -> Result<ModelSelection> {
        let split = holdout_split(
            matrix.len(),
            self.config.holdout_fraction,
            self.config.min_holdout,
            self.config.min_train,
        )
        .map_err(|e| MacroError::NoViableModel {
            series: series.to_string(),
            reasons: vec![e.to_string()],
        })?;

        let (train_rows, holdout_rows) = matrix.rows().split_at(split.train);
        let (train_targets, holdout_targets) = matrix.targets().split_at(split.train);
        let previous = train_targets[train_targets.len() - 1];

        let mut scores = Vec::new();
        let mut failures = Vec::new();
        for spec in &self.config.candidates {
            let scored = spec
                .fit(train_rows, train_targets)
                .and_then(|fitted| fitted.predict_all(holdout_rows))
                .and_then(|predictions| {
                    evaluate_forecast(spec.name(), &predictions, holdout_targets, previous)
                });
            match scored {
                Ok(score) => {
                    debug!(
                        series,
                        candidate = spec.name(),
                        mae = score.mae,
                        rmse = score.rmse,
                        direction = score.directional_accuracy,
                        "scored candidate"
                    );
                    scores.push((spec, score));
                }
                Err(e) => {
                    warn!(series, candidate = spec.name(), error = %e, "candidate failed");
                    failures.push(CandidateFailure {
                        candidate: spec.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let ranked = ranking(scores.iter().map(|(_, s)| s));

        // The refit can still fail (e.g. a degenerate column only in the holdout).
        for &i in &ranked {
            let (spec, score) = &scores[i];
            match refit(spec, matrix) {
                Ok(model) => {
                    info!(
                        series,
                        winner = spec.name(),
                        mae = score.mae,
                        train = split.train,
                        holdout = split.holdout,
                        "selected model"
                    );
                    let score = score.clone();
                    return Ok(ModelSelection {
                        model,
                        score,
                        scores: scores.into_iter().map(|(_, s)| s).collect(),
                        failures,
                    });
                }
                Err(e) => {
                    warn!(series, candidate = spec.name(), error = %e, "refit failed");
                    failures.push(CandidateFailure {
                        candidate: spec.name().to_string(),
                        reason: format!("refit: {}", e),
                    });
                }
            }
        }

        Err(MacroError::NoViableModel {
            series: series.to_string(),
            reasons: failures
                .into_iter()
                .map(|f| format!("{}: {}", f.candidate, f.reason))
                .collect(),
        })
    }
}

fn refit(spec: &ModelSpec, matrix: &FeatureMatrix) -> Result<ModelCandidate> {
    let model = spec.fit(matrix.rows(), matrix.targets())?;
    // A refit that cannot predict its own last row is not usable for forecasting.
    if let Some(row) = matrix.rows().last() {
        model.predict(row)?;
    }
    Ok(model)
}

/// Holdout MAE on a grid of `MAE_TIE_TOLERANCE`, so near-ties compare equal
/// and the ordering stays transitive
fn mae_bucket(score: &EvaluationScore) -> f64 {
    (score.mae / MAE_TIE_TOLERANCE).round()
}

/// Score positions from best to worst; earlier declarations win exact ties
fn ranking<'a>(scores: impl Iterator<Item = &'a EvaluationScore>) -> Vec<usize> {
    let scores: Vec<&EvaluationScore> = scores.collect();
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // Stable sort keeps declaration order among equal keys.
    order.sort_by(|&a, &b| {
        mae_bucket(scores[a])
            .total_cmp(&mae_bucket(scores[b]))
            .then_with(|| {
                scores[b]
                    .directional_accuracy
                    .total_cmp(&scores[a].directional_accuracy)
            })
    });
    order
}
