//! Descriptive statistics and scoring helpers
//!
//! Contains:
//! - Linear-interpolation quantiles
//! - RMSE that skips undefined positions
//! - Decimal rounding and non-finite sanitization

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Compute the `q`-th quantile (0.0..=1.0) using linear interpolation
/// between the two closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute a quantile of an empty series".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be between 0 and 1, got {}",
            q
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Quantile input contains non-finite values".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Root-mean-squared error between predictions and actual values.
///
/// Positions where either side is NaN or infinite are ignored. When no
/// position is usable the score is `f64::INFINITY`.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    let (sum, count) = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p.is_finite() && a.is_finite())
        .fold((0.0, 0usize), |(sum, count), (p, a)| {
            (sum + (p - a).powi(2), count + 1)
        });

    if count == 0 {
        return f64::INFINITY;
    }

    (sum / count as f64).sqrt()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Replace NaN and infinities with `fallback`.
pub fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Smallest and largest value of a non-empty slice.
pub fn min_max(values: &[f64]) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the range of an empty series".to_string(),
        ));
    }
    Ok((Statistics::min(values.iter()), Statistics::max(values.iter())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];

        // position = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert_relative_eq!(quantile(&values, 0.75).unwrap(), 3.25);
        assert_relative_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_quantile_ignores_input_order() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 1.75);
    }

    #[test]
    fn test_quantile_rejects_bad_input() {
        assert!(quantile(&[], 0.5).is_err());
        assert!(quantile(&[1.0], 1.5).is_err());
        assert!(quantile(&[1.0, f64::NAN], 0.5).is_err());
    }

    #[test]
    fn test_rmse_skips_undefined_positions() {
        let predicted = [1.0, f64::NAN, 3.0];
        let actual = [2.0, 5.0, 3.0];

        // Only positions 0 and 2 count: sqrt((1 + 0) / 2)
        assert_relative_eq!(rmse(&predicted, &actual), 0.5f64.sqrt());
    }

    #[test]
    fn test_rmse_all_undefined_is_infinite() {
        assert_eq!(rmse(&[f64::NAN, 1.0], &[1.0, f64::INFINITY]), f64::INFINITY);
        assert_eq!(rmse(&[], &[]), f64::INFINITY);
    }

    #[test]
    fn test_round_and_sanitize() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-1.00004, 4), -1.0);
        assert_eq!(sanitize(f64::NAN, 0.0), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY, 0.0), 0.0);
        assert_eq!(sanitize(2.5, 0.0), 2.5);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, -1.0, 2.0]).unwrap(), (-1.0, 3.0));
        assert!(min_max(&[]).is_err());
    }
}
