//! Metrics for evaluating forecast performance

use crate::error::{MacroError, Result};
use serde::Serialize;

/// Moves smaller than this are treated as flat
const DIRECTION_TOLERANCE: f64 = 1e-10;

/// Holdout performance of one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationScore {
    /// Candidate name
    pub candidate: String,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Share of holdout moves whose direction was predicted, in [0, 1]
    pub directional_accuracy: f64,
}

/// Score predictions against actual holdout values.
///
/// `previous` is the last label before the holdout. The predicted direction
/// at step `t` is `prediction[t] - actual[t-1]`, compared with the realised
/// move `actual[t] - actual[t-1]`; steps where either move is flat do not
/// count. With no countable step the directional accuracy is 0.
pub fn evaluate_forecast(
    candidate: &str,
    predictions: &[f64],
    actual: &[f64],
    previous: f64,
) -> Result<EvaluationScore> {
    if predictions.len() != actual.len() || predictions.is_empty() {
        return Err(MacroError::InvalidParameter(
            "Predictions and actual values must have the same non-zero length".to_string(),
        ));
    }
    if predictions.iter().any(|p| !p.is_finite()) {
        return Err(MacroError::ModelFit(format!(
            "{} produced a non-finite prediction",
            candidate
        )));
    }

    let n = actual.len() as f64;
    let mae = predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / n;
    let mse = predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / n;

    Ok(EvaluationScore {
        candidate: candidate.to_string(),
        mae,
        rmse: mse.sqrt(),
        directional_accuracy: directional_accuracy(predictions, actual, previous),
    })
}

fn directional_accuracy(predictions: &[f64], actual: &[f64], previous: f64) -> f64 {
    let mut base = previous;
    let mut correct = 0usize;
    let mut total = 0usize;

    for (&p, &a) in predictions.iter().zip(actual) {
        let predicted_move = p - base;
        let actual_move = a - base;
        if predicted_move.abs() > DIRECTION_TOLERANCE && actual_move.abs() > DIRECTION_TOLERANCE {
            total += 1;
            if (predicted_move > 0.0) == (actual_move > 0.0) {
                correct += 1;
            }
        }
        base = a;
    }

    if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    }
}

impl std::fmt::Display for EvaluationScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Holdout Metrics ({}):", self.candidate)?;
        writeln!(f, "  MAE:       {:.4}", self.mae)?;
        writeln!(f, "  RMSE:      {:.4}", self.rmse)?;
        writeln!(f, "  Direction: {:.2}%", self.directional_accuracy * 100.0)?;
        Ok(())
    }
}
