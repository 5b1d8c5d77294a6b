//! Exponential smoothing weights

use crate::{MathError, Result};

/// Weights `alpha * (1 - alpha)^(k - 1)` for each lag `k`, renormalised to sum to 1.
///
/// With a contiguous lag set `1..=n` and large `n` this converges to the
/// simple exponential smoothing level; sparse lag sets keep the same decay
/// profile over the lags that are present.
pub fn exponential_weights(lags: &[usize], alpha: f64) -> Result<Vec<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(MathError::InvalidInput(
            "Alpha must be in (0, 1]".to_string(),
        ));
    }
    if lags.is_empty() || lags.contains(&0) {
        return Err(MathError::InvalidInput(
            "Lags must be non-empty and at least 1".to_string(),
        ));
    }

    let raw: Vec<f64> = lags
        .iter()
        .map(|&k| alpha * (1.0 - alpha).powi(k as i32 - 1))
        .collect();
    let total: f64 = raw.iter().sum();

    if total <= 0.0 {
        return Err(MathError::CalculationError(
            "Exponential weights vanished".to_string(),
        ));
    }

    Ok(raw.into_iter().map(|w| w / total).collect())
}

/// Evenly spaced smoothing parameters strictly inside (0, 1)
pub fn alpha_grid(steps: usize) -> Vec<f64> {
    (1..=steps)
        .map(|i| i as f64 / (steps + 1) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_sum_to_one() {
        let w = exponential_weights(&[1, 3, 6, 12], 0.4).unwrap();
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(w.windows(2).all(|p| p[0] > p[1]));
    }

    #[test]
    fn test_alpha_one_uses_first_lag() {
        let w = exponential_weights(&[1, 2, 3], 1.0).unwrap();
        assert_eq!(w, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(exponential_weights(&[1, 2], 0.0).is_err());
        assert!(exponential_weights(&[0, 2], 0.5).is_err());
        assert!(exponential_weights(&[], 0.5).is_err());
    }

    #[test]
    fn test_alpha_grid() {
        let grid = alpha_grid(9);
        assert_eq!(grid.len(), 9);
        assert_relative_eq!(grid[0], 0.1);
        assert_relative_eq!(grid[8], 0.9);
    }
}
