//! Least-squares regression
//!
//! Contains:
//! - A dense linear system solver (Gaussian elimination with partial pivoting)
//! - Ridge regression over standardised features

use crate::{MathError, Result, EPSILON};
use serde::{Deserialize, Serialize};

/// Solve `a * x = b` for a square system.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {}x{} system matrix",
            n, n
        )));
    }

    for col in 0..n {
        // Partial pivoting keeps elimination stable for poorly scaled inputs
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);

        if a[pivot_row][col].abs() < EPSILON {
            return Err(MathError::CalculationError(
                "Linear system is singular".to_string(),
            ));
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

/// Fitted ridge regression, with coefficients expressed on the original feature scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeFit {
    /// Intercept term
    pub intercept: f64,
    /// One coefficient per input column (zero for excluded columns)
    pub coefficients: Vec<f64>,
    /// Whether each column had enough variance to take part in the fit
    pub active: Vec<bool>,
}

impl RidgeFit {
    /// Predict the response for one feature vector
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }
}

/// Ridge regression on standardised columns.
///
/// Columns with zero variance are excluded from the fit and receive a zero
/// coefficient. Fails when no column has any variance.
pub fn ridge_regression<R: AsRef<[f64]>>(
    rows: &[R],
    targets: &[f64],
    lambda: f64,
) -> Result<RidgeFit> {
    if rows.is_empty() || rows.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Expected matching non-empty rows and targets, got {} rows and {} targets",
            rows.len(),
            targets.len()
        )));
    }
    if lambda < 0.0 || !lambda.is_finite() {
        return Err(MathError::InvalidInput(
            "Ridge penalty must be a finite non-negative number".to_string(),
        ));
    }

    let n = rows.len();
    let p = rows[0].as_ref().len();
    if rows.iter().any(|r| r.as_ref().len() != p) {
        return Err(MathError::InvalidInput(
            "All rows must have the same number of features".to_string(),
        ));
    }

    let mut means = vec![0.0; p];
    let mut stds = vec![0.0; p];
    for j in 0..p {
        let column: Vec<f64> = rows.iter().map(|r| r.as_ref()[j]).collect();
        let mu = column.iter().sum::<f64>() / n as f64;
        let var = column.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / n as f64;
        means[j] = mu;
        stds[j] = var.sqrt();
    }

    let active: Vec<bool> = stds.iter().map(|s| *s > EPSILON).collect();
    let columns: Vec<usize> = (0..p).filter(|&j| active[j]).collect();
    if columns.is_empty() {
        return Err(MathError::CalculationError(
            "Every feature has zero variance".to_string(),
        ));
    }

    let y_mean = targets.iter().sum::<f64>() / n as f64;
    let standardized: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| {
            let r = r.as_ref();
            columns
                .iter()
                .map(|&j| (r[j] - means[j]) / stds[j])
                .collect()
        })
        .collect();

    let k = columns.len();
    let mut gram = vec![vec![0.0; k]; k];
    let mut moment = vec![0.0; k];
    for (z, &y) in standardized.iter().zip(targets) {
        for a in 0..k {
            moment[a] += z[a] * (y - y_mean);
            for b in 0..k {
                gram[a][b] += z[a] * z[b];
            }
        }
    }
    for (a, row) in gram.iter_mut().enumerate() {
        row[a] += lambda;
    }

    let beta = solve_linear_system(gram, moment)?;

    let mut coefficients = vec![0.0; p];
    for (&j, b) in columns.iter().zip(&beta) {
        coefficients[j] = b / stds[j];
    }
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&means)
            .map(|(c, m)| c * m)
            .sum::<f64>();

    Ok(RidgeFit {
        intercept,
        coefficients,
        active,
    })
}
