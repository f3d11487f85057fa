//! Outlier clipping and scaling of an index series before model fitting

use crate::config::CleaningConfig;
use crate::data::{IndexName, IndexSeries, TimeSeriesPoint};
use crate::error::Result;
use chrono::NaiveDate;
use index_math::{IqrFence, MinMaxScaler};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything needed to map model outputs back to physical units.
///
/// Created once per series and run; never shared between indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingContext {
    /// Lower IQR fence used for clipping
    pub lower_bound: f64,
    /// Upper IQR fence used for clipping
    pub upper_bound: f64,
    /// Minimum of the clipped series
    pub scale_min: f64,
    /// Maximum of the clipped series
    pub scale_max: f64,
}

impl ScalingContext {
    fn scaler(&self) -> MinMaxScaler {
        MinMaxScaler::from_bounds(self.scale_min, self.scale_max)
    }

    /// True when the clipped series was constant
    pub fn is_degenerate(&self) -> bool {
        self.scaler().is_degenerate()
    }

    /// Map physical values into the model space
    pub fn scale(&self, values: &[f64]) -> Vec<f64> {
        self.scaler().transform(values)
    }

    /// Map model outputs back to physical units
    pub fn inverse(&self, scaled: &[f64]) -> Vec<f64> {
        self.scaler().inverse(scaled)
    }
}

/// Drop observations at or below the index's validity floor, if one is set
pub fn apply_validity_floor(series: &IndexSeries, config: &CleaningConfig) -> IndexSeries {
    let mut series = series.clone();
    if let Some(&floor) = config.validity_floor.get(&series.index()) {
        let before = series.len();
        series.retain_above(floor);
        debug!(
            index = %series.index(),
            floor,
            dropped = before - series.len(),
            "applied validity floor"
        );
    }
    series
}

/// A series after clipping and scaling
#[derive(Debug, Clone)]
pub struct PreparedSeries {
    index: IndexName,
    dates: Vec<NaiveDate>,
    cleaned: Vec<f64>,
    scaled: Vec<f64>,
    context: ScalingContext,
}

impl PreparedSeries {
    /// Clip to the IQR fence and rescale. An empty series is a `MathError`.
    pub fn prepare(series: &IndexSeries, config: &CleaningConfig) -> Result<Self> {
        let index = series.index();
        let raw = series.values();
        let fence = IqrFence::from_series(&raw, config.iqr_multiplier)?;
        let cleaned = fence.clip(&raw);
        let clipped = raw
            .iter()
            .zip(&cleaned)
            .filter(|(r, c)| r != c)
            .count();
        if clipped > 0 {
            debug!(%index, clipped, lower = fence.lower, upper = fence.upper, "clipped outliers");
        }

        let scaler = MinMaxScaler::fit(&cleaned)?;
        if scaler.is_degenerate() {
            warn!(%index, value = scaler.min(), "series has zero range; scaling to constant 0.0");
        }
        let scaled = scaler.transform(&cleaned);

        Ok(Self {
            index,
            dates: series.dates(),
            cleaned,
            scaled,
            context: ScalingContext {
                lower_bound: fence.lower,
                upper_bound: fence.upper,
                scale_min: scaler.min(),
                scale_max: scaler.max(),
            },
        })
    }

    /// Index the series belongs to
    pub fn index(&self) -> IndexName {
        self.index
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Clipped values in physical units
    pub fn cleaned(&self) -> &[f64] {
        &self.cleaned
    }

    /// Clipped values in model space
    pub fn scaled(&self) -> &[f64] {
        &self.scaled
    }

    /// Inverse-transform parameters
    pub fn context(&self) -> &ScalingContext {
        &self.context
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no points
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Cleaned history as dated points
    pub fn history(&self) -> Vec<TimeSeriesPoint> {
        self.dates
            .iter()
            .zip(&self.cleaned)
            .map(|(&date, &value)| TimeSeriesPoint { date, value })
            .collect()
    }
}
