//! Descriptive statistics over `f64` slices
//!
//! Contains:
//! - Mean and standard deviation (population and sample)
//! - Z-score normalisation
//! - Rolling mean / rolling standard deviation
//! - Percentile rank and trend slope

use crate::{MathError, Result, EPSILON};
use statrs::statistics::Statistics;

/// Arithmetic mean of a non-empty slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().mean())
}

/// Population standard deviation (divides by `n`)
pub fn population_std_dev(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the standard deviation of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().population_std_dev())
}

/// Sample standard deviation (divides by `n - 1`)
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(
            "Sample standard deviation needs at least 2 points".to_string(),
        ));
    }

    Ok(values.iter().std_dev())
}

/// Standardise values to mean 0 and unit (population) variance.
///
/// Fails when the input has no variance, since every z-score would be undefined.
pub fn zscores(values: &[f64]) -> Result<Vec<f64>> {
    let mu = mean(values)?;
    let sigma = population_std_dev(values)?;

    if sigma < EPSILON {
        return Err(MathError::CalculationError(
            "Cannot standardise a series with zero variance".to_string(),
        ));
    }

    Ok(values.iter().map(|v| (v - mu) / sigma).collect())
}

/// Rolling mean; output has `values.len() - window + 1` entries
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window(values, window)?;

    Ok(values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect())
}

/// Rolling sample standard deviation; output has `values.len() - window + 1` entries
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window(values, window)?;
    if window < 2 {
        return Err(MathError::InvalidInput(
            "Rolling standard deviation needs a window of at least 2".to_string(),
        ));
    }

    Ok(values.windows(window).map(|w| w.iter().std_dev()).collect())
}

fn check_window(values: &[f64], window: usize) -> Result<()> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window size must be positive".to_string(),
        ));
    }
    if values.len() < window {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} values for the window, got {}",
            window,
            values.len()
        )));
    }
    Ok(())
}

/// Mid-rank percentile of `value` within `population`, in [0, 1].
///
/// Values strictly below count fully, ties count half, so a value that
/// equals every member of the population ranks at 0.5.
pub fn percentile_rank(population: &[f64], value: f64) -> Result<f64> {
    if population.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot rank against an empty population".to_string(),
        ));
    }

    let below = population.iter().filter(|&&p| p < value).count() as f64;
    let equal = population
        .iter()
        .filter(|&&p| (p - value).abs() <= EPSILON)
        .count() as f64;

    Ok((below + 0.5 * equal) / population.len() as f64)
}

/// Least-squares slope of the values against their index
pub fn trend_slope(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(
            "Not enough data to calculate slope. Need at least 2 points.".to_string(),
        ));
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    Ok(numerator / denominator)
}

/// Linear interpolation between `(x0, y0)` and `(x1, y1)` evaluated at `x`
pub fn interpolate(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if (x1 - x0).abs() < EPSILON {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
