//! Pipeline configuration
//!
//! Every section has defaults, so a JSON file only needs to name the values
//! it overrides.

use crate::data::IndexName;
use crate::error::{ForecastError, Result};
use index_math::outliers::DEFAULT_IQR_MULTIPLIER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub selection: SelectionConfig,
    pub cleaning: CleaningConfig,
    pub seasonal: SeasonalConfig,
    pub forest: ForestConfig,
    pub boosting_depthwise: BoostingConfig,
    pub boosting_leafwise: BoostingConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            cleaning: CleaningConfig::default(),
            seasonal: SeasonalConfig::default(),
            forest: ForestConfig::default(),
            boosting_depthwise: BoostingConfig::depthwise(),
            boosting_leafwise: BoostingConfig::leafwise(),
        }
    }
}

impl ForecastConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text and validate it
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the forecast horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.selection.horizon = horizon;
        self
    }

    /// Override the per-index wall-clock budget
    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.selection.time_budget_secs = budget.map(|d| d.as_secs_f64());
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        let s = &self.selection;
        if s.test_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "test_size must be at least 1".to_string(),
            ));
        }
        if s.min_points <= s.test_size {
            return Err(ForecastError::InvalidParameter(format!(
                "min_points ({}) must exceed test_size ({})",
                s.min_points, s.test_size
            )));
        }
        if s.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        s.time_budget()?;
        if self.cleaning.iqr_multiplier < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "iqr_multiplier must be non-negative".to_string(),
            ));
        }
        if self.seasonal.changepoint_prior_scale <= 0.0
            || self.seasonal.seasonality_prior_scale <= 0.0
        {
            return Err(ForecastError::InvalidParameter(
                "seasonal prior scales must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.seasonal.changepoint_range) {
            return Err(ForecastError::InvalidParameter(
                "changepoint_range must be in [0, 1)".to_string(),
            ));
        }
        if self.forest.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "forest n_estimators must be at least 1".to_string(),
            ));
        }
        for (name, b) in [
            ("boosting_depthwise", &self.boosting_depthwise),
            ("boosting_leafwise", &self.boosting_leafwise),
        ] {
            if b.n_estimators == 0 || b.learning_rate <= 0.0 || b.learning_rate > 1.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} needs n_estimators >= 1 and 0 < learning_rate <= 1",
                    name
                )));
            }
            if b.min_samples_leaf == 0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} min_samples_leaf must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Hold-out split, horizon and budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Points held out for scoring
    pub test_size: usize,
    /// Minimum usable points per index
    pub min_points: usize,
    /// Months forecast after the last observation
    pub horizon: usize,
    /// Decimal places kept in reported values
    pub decimals: u32,
    /// Per-index wall-clock budget for candidate fitting
    pub time_budget_secs: Option<f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            test_size: 6,
            min_points: 12,
            horizon: 12,
            decimals: 4,
            time_budget_secs: Some(30.0),
        }
    }
}

impl SelectionConfig {
    /// Budget as a duration, if any. Zero means already exhausted.
    pub fn time_budget(&self) -> Result<Option<Duration>> {
        self.time_budget_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    ForecastError::InvalidParameter(format!(
                        "time_budget_secs must be a non-negative number of seconds, got {}",
                        secs
                    ))
                })
            })
            .transpose()
    }
}

/// Outlier handling before scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Tukey fence multiplier
    pub iqr_multiplier: f64,
    /// Observations at or below the floor are dropped before clipping
    /// (e.g. cloud-contaminated pixels). Empty by default.
    pub validity_floor: BTreeMap<IndexName, f64>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            validity_floor: BTreeMap::new(),
        }
    }
}

impl CleaningConfig {
    /// Cloud filter: keep LST above zero and the normalized indices above 0.05
    pub fn cloud_filter() -> Self {
        let validity_floor = IndexName::ALL
            .into_iter()
            .map(|index| match index {
                IndexName::Lst => (index, 0.0),
                _ => (index, 0.05),
            })
            .collect();
        Self {
            validity_floor,
            ..Self::default()
        }
    }
}

/// Trend + yearly seasonality model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalConfig {
    /// Number of Fourier pairs for the yearly cycle
    pub yearly_order: usize,
    /// Upper bound on trend changepoints
    pub n_changepoints: usize,
    /// Share of history where changepoints may be placed
    pub changepoint_range: f64,
    /// Flexibility of the trend
    pub changepoint_prior_scale: f64,
    /// Flexibility of the seasonal cycle
    pub seasonality_prior_scale: f64,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            yearly_order: 3,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
        }
    }
}

/// Bagged regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub seed: u64,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Gradient boosting on regression trees.
///
/// A section given in JSON must be complete; omitted sections keep their
/// variant-specific defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    /// Depth limit for depth-wise growth
    pub max_depth: Option<usize>,
    /// Leaf limit for best-first growth
    pub max_leaves: Option<usize>,
    pub min_samples_leaf: usize,
    /// L2 penalty on leaf values
    pub l2_regularization: f64,
}

impl BoostingConfig {
    /// Depth-limited trees with L2-regularised leaves
    pub fn depthwise() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.05,
            max_depth: Some(5),
            max_leaves: None,
            min_samples_leaf: 1,
            l2_regularization: 1.0,
        }
    }

    /// Best-first trees limited by leaf count
    pub fn leafwise() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.05,
            max_depth: None,
            max_leaves: Some(31),
            min_samples_leaf: 20,
            l2_regularization: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection.horizon, 12);
        assert_eq!(config.selection.test_size, 6);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.boosting_depthwise.max_depth, Some(5));
        assert_eq!(config.boosting_leafwise.max_leaves, Some(31));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            ForecastConfig::from_json_str(r#"{"selection": {"horizon": 6}, "forest": {"seed": 7}}"#)
                .unwrap();
        assert_eq!(config.selection.horizon, 6);
        assert_eq!(config.selection.min_points, 12);
        assert_eq!(config.forest.seed, 7);
        assert_eq!(config.forest.n_estimators, 100);
    }

    #[test]
    fn test_validity_floor_keys() {
        let config = ForecastConfig::from_json_str(
            r#"{"cleaning": {"validity_floor": {"LST": 0.0, "NDVI": 0.05}}}"#,
        )
        .unwrap();
        assert_eq!(config.cleaning.validity_floor.get(&IndexName::Ndvi), Some(&0.05));
        assert_eq!(config.cleaning.validity_floor.get(&IndexName::Ndwi), None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ForecastConfig::from_json_str(r#"{"selection": {"test_size": 0}}"#).is_err());
        assert!(
            ForecastConfig::from_json_str(r#"{"selection": {"min_points": 6, "test_size": 6}}"#)
                .is_err()
        );
        assert!(ForecastConfig::from_json_str(
            r#"{"boosting_depthwise": {"n_estimators": 10, "learning_rate": 0.0,
                "max_depth": 3, "min_samples_leaf": 1, "l2_regularization": 0.0}}"#
        )
        .is_err());
        assert!(ForecastConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_time_budget_bounds() {
        let zero = ForecastConfig::default().with_time_budget(Some(Duration::ZERO));
        assert!(zero.validate().is_ok());
        assert_eq!(zero.selection.time_budget().unwrap(), Some(Duration::ZERO));

        for secs in [-1.0, f64::NAN, f64::INFINITY] {
            let mut config = ForecastConfig::default();
            config.selection.time_budget_secs = Some(secs);
            assert!(matches!(
                config.selection.time_budget(),
                Err(ForecastError::InvalidParameter(_))
            ));
            assert!(config.validate().is_err());
        }
    }
}
