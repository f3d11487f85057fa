//! Interquartile-range outlier fences
//!
//! Values outside `[Q1 - k * IQR, Q3 + k * IQR]` are treated as outliers
//! (cloud contamination, sensor glitches) and capped at the fence.

use crate::stats::quantile;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Standard Tukey multiplier
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Outlier fence computed from a series' quartiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrFence {
    /// First quartile
    pub q1: f64,
    /// Third quartile
    pub q3: f64,
    /// Lower clipping bound
    pub lower: f64,
    /// Upper clipping bound
    pub upper: f64,
}

impl IqrFence {
    /// Compute the fence for a non-empty series
    pub fn from_series(values: &[f64], multiplier: f64) -> Result<Self> {
        if multiplier < 0.0 || !multiplier.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "IQR multiplier must be a non-negative number, got {}",
                multiplier
            )));
        }

        let q1 = quantile(values, 0.25)?;
        let q3 = quantile(values, 0.75)?;
        let iqr = q3 - q1;

        Ok(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Width of the interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whether a value lies inside the fence (bounds included)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clamp every value into the fence, preserving length and order
    pub fn clip(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .map(|&v| v.clamp(self.lower, self.upper))
            .collect()
    }
}

/// Compute the fence of `values` and clip them to it in one step
pub fn clip_outliers(values: &[f64], multiplier: f64) -> Result<(Vec<f64>, IqrFence)> {
    let fence = IqrFence::from_series(values, multiplier)?;
    Ok((fence.clip(values), fence))
}
