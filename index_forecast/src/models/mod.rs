//! Candidate forecasting models
//!
//! Every candidate implements [`ForecastModel`]: fitting produces a boxed
//! [`TrainedForecastModel`] that predicts scaled values for a date axis.
//! The seasonal model reads the dates directly; the tree models read the
//! calendar feature rows.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

pub mod boosting;
pub mod forest;
pub mod seasonal;
pub mod tree;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use seasonal::SeasonalTrend;

/// The competing strategies, in tie-breaking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Additive trend + yearly seasonality
    #[serde(rename = "seasonal_trend")]
    Seasonal,
    /// Bagged regression trees
    RandomForest,
    /// Gradient boosting with depth-limited trees
    GradientBoostingDepthwise,
    /// Gradient boosting with leaf-limited, best-first trees
    GradientBoostingLeafwise,
}

impl ModelKind {
    /// Pool order
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Seasonal,
        ModelKind::RandomForest,
        ModelKind::GradientBoostingDepthwise,
        ModelKind::GradientBoostingLeafwise,
    ];

    /// Identifier reported as `model_used`
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Seasonal => "seasonal_trend",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoostingDepthwise => "gradient_boosting_depthwise",
            ModelKind::GradientBoostingLeafwise => "gradient_boosting_leafwise",
        }
    }

    /// Instantiate the configured model of this kind
    pub fn build(&self, config: &ForecastConfig) -> Box<dyn ForecastModel> {
        match self {
            ModelKind::Seasonal => Box::new(SeasonalTrend::new(config.seasonal.clone())),
            ModelKind::RandomForest => Box::new(RandomForest::new(config.forest.clone())),
            ModelKind::GradientBoostingDepthwise => Box::new(GradientBoosting::new(
                ModelKind::GradientBoostingDepthwise,
                config.boosting_depthwise.clone(),
            )),
            ModelKind::GradientBoostingLeafwise => Box::new(GradientBoosting::new(
                ModelKind::GradientBoostingLeafwise,
                config.boosting_leafwise.clone(),
            )),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Date axis and matching feature rows a model is fitted on or predicts for
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    dates: &'a [NaiveDate],
    features: &'a [FeatureRow],
}

impl<'a> ModelInput<'a> {
    /// Pair a date axis with its feature rows
    pub fn new(dates: &'a [NaiveDate], features: &'a [FeatureRow]) -> Result<Self> {
        if dates.len() != features.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match features length ({})",
                dates.len(),
                features.len()
            )));
        }
        Ok(Self { dates, features })
    }

    /// Observation dates
    pub fn dates(&self) -> &'a [NaiveDate] {
        self.dates
    }

    /// Calendar feature rows
    pub fn features(&self) -> &'a [FeatureRow] {
        self.features
    }

    /// Feature rows as numeric vectors
    pub fn feature_matrix(&self) -> Vec<[f64; crate::features::FEATURE_COUNT]> {
        self.features.iter().map(FeatureRow::to_vector).collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Scaled predictions, one per input row
    fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<f64>>;

    /// Which strategy produced this model
    fn kind(&self) -> ModelKind;
}

/// Forecast model that can be trained on a scaled series
pub trait ForecastModel: Debug {
    /// Fit on `targets`, one per input row
    fn fit(&self, input: &ModelInput<'_>, targets: &[f64]) -> Result<Box<dyn TrainedForecastModel>>;

    /// Which strategy this is
    fn kind(&self) -> ModelKind;
}

/// Common argument checks for every candidate
pub(crate) fn check_training_data(
    kind: ModelKind,
    input: &ModelInput<'_>,
    targets: &[f64],
) -> Result<()> {
    if input.is_empty() {
        return Err(ForecastError::candidate(kind, "no training rows"));
    }
    if input.len() != targets.len() {
        return Err(ForecastError::candidate(
            kind,
            format!(
                "{} input rows but {} targets",
                input.len(),
                targets.len()
            ),
        ));
    }
    if targets.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::candidate(kind, "targets contain non-finite values"));
    }
    Ok(())
}

/// The fixed set of candidates competing for each index
#[derive(Debug)]
pub struct CandidatePool {
    candidates: Vec<Box<dyn ForecastModel>>,
}

impl CandidatePool {
    /// All four strategies, configured from `config`, in pool order
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            candidates: ModelKind::ALL.iter().map(|kind| kind.build(config)).collect(),
        }
    }

    /// A pool of explicitly supplied candidates, kept in the given order
    pub fn with_candidates(candidates: Vec<Box<dyn ForecastModel>>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "candidate pool cannot be empty".to_string(),
            ));
        }
        Ok(Self { candidates })
    }

    /// Candidates in pool order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ForecastModel> {
        self.candidates.iter().map(|c| c.as_ref())
    }

    /// First candidate of a given kind
    pub fn get(&self, kind: ModelKind) -> Option<&dyn ForecastModel> {
        self.iter().find(|c| c.kind() == kind)
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the pool has no candidates
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_order_matches_kinds() {
        let pool = CandidatePool::from_config(&ForecastConfig::default());
        let kinds: Vec<ModelKind> = pool.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, ModelKind::ALL.to_vec());
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(CandidatePool::with_candidates(Vec::new()).is_err());
    }

    #[test]
    fn test_model_input_length_mismatch() {
        let dates = [NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()];
        assert!(ModelInput::new(&dates, &[]).is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ModelKind::Seasonal.to_string(), "seasonal_trend");
        assert_eq!(
            serde_json::to_string(&ModelKind::GradientBoostingLeafwise).unwrap(),
            "\"gradient_boosting_leafwise\""
        );
    }
}
