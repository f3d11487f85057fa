//! Min-max scaling with a retained inverse transform

use crate::stats::min_max;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Range below which a series is treated as constant
const DEGENERATE_RANGE: f64 = 1e-12;

/// Maps a series onto `[0, 1]` and back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Learn the range of a non-empty series
    pub fn fit(values: &[f64]) -> Result<Self> {
        let (min, max) = min_max(values)?;
        Ok(Self { min, max })
    }

    /// Rebuild a scaler from a previously fitted range
    pub fn from_bounds(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest value seen during fitting
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value seen during fitting
    pub fn max(&self) -> f64 {
        self.max
    }

    /// True when the fitted series had (numerically) zero range.
    ///
    /// A degenerate scaler maps every input to `0.0` and every scaled value
    /// back to the constant it was fitted on.
    pub fn is_degenerate(&self) -> bool {
        (self.max - self.min).abs() < DEGENERATE_RANGE
    }

    /// Scale a single value
    pub fn transform_value(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.min) / (self.max - self.min)
    }

    /// Scale a series
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_value(v)).collect()
    }

    /// Map a scaled value back to original units
    pub fn inverse_value(&self, scaled: f64) -> f64 {
        if self.is_degenerate() {
            return self.min;
        }
        scaled * (self.max - self.min) + self.min
    }

    /// Map a scaled series back to original units
    pub fn inverse(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&v| self.inverse_value(v)).collect()
    }
}
