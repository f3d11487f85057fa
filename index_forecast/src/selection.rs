//! Hold-out model selection
//!
//! The last `test_size` points of a scaled series are held out, every
//! candidate in the pool is fitted on the rest and scored by RMSE on the
//! hold-out. A candidate that fails scores `+inf`; the lowest score wins
//! and ties keep pool order.

use crate::config::SelectionConfig;
use crate::data::IndexName;
use crate::error::{ForecastError, Result};
use crate::features::build_features;
use crate::models::{CandidatePool, ForecastModel, ModelInput, ModelKind, TrainedForecastModel};
use chrono::NaiveDate;
use index_math::stats::rmse;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Hold-out score of one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub model: ModelKind,
    /// `f64::INFINITY` when the candidate failed
    pub rmse: f64,
    /// Why the candidate failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl CandidateScore {
    fn scored(model: ModelKind, rmse: f64) -> Self {
        Self {
            model,
            rmse,
            failure: None,
        }
    }

    fn failed(model: ModelKind, reason: impl Into<String>) -> Self {
        Self {
            model,
            rmse: f64::INFINITY,
            failure: Some(reason.into()),
        }
    }

    /// Whether the candidate produced a usable score
    pub fn is_valid(&self) -> bool {
        self.rmse.is_finite()
    }
}

/// Outcome of a selection round.
///
/// Only the winner's train-split fit is kept; the losing fits are dropped
/// when selection returns.
#[derive(Debug)]
pub struct Selection {
    pub winner: ModelKind,
    /// Winning hold-out RMSE (finite)
    pub rmse: f64,
    /// Every candidate's score in pool order
    pub scores: Vec<CandidateScore>,
    /// Winner fitted on the training split
    pub fitted: Box<dyn TrainedForecastModel>,
}

/// Chooses the best candidate for a series
#[derive(Debug)]
pub struct ModelSelector<'a> {
    pool: &'a CandidatePool,
    config: &'a SelectionConfig,
}

impl<'a> ModelSelector<'a> {
    pub fn new(pool: &'a CandidatePool, config: &'a SelectionConfig) -> Self {
        Self { pool, config }
    }

    /// Score every candidate on the hold-out and pick the winner.
    ///
    /// `dates` and `values` are the prepared (scaled) series of `index`.
    pub fn select(&self, index: IndexName, dates: &[NaiveDate], values: &[f64]) -> Result<Selection> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        let required = self.config.min_points.max(self.config.test_size + 1);
        if values.len() < required {
            return Err(ForecastError::InsufficientData {
                index,
                available: values.len(),
                required,
            });
        }

        let split = values.len() - self.config.test_size;
        let features = build_features(dates);
        let train = ModelInput::new(&dates[..split], &features[..split])?;
        let test = ModelInput::new(&dates[split..], &features[split..])?;
        let actual = &values[split..];

        let started = Instant::now();
        let budget = self.config.time_budget()?;
        let mut scores = Vec::with_capacity(self.pool.len());
        let mut fits: Vec<Option<Box<dyn TrainedForecastModel>>> = Vec::with_capacity(self.pool.len());

        for candidate in self.pool.iter() {
            let kind = candidate.kind();
            if budget.map_or(false, |b| started.elapsed() >= b) {
                warn!(%index, model = %kind, "skipping candidate: time budget exceeded");
                scores.push(CandidateScore::failed(kind, "time budget exceeded"));
                fits.push(None);
                continue;
            }

            let (score, fit) = match evaluate(candidate, &train, &values[..split], &test, actual) {
                Ok((rmse, fit)) => (CandidateScore::scored(kind, rmse), Some(fit)),
                Err(e) => {
                    warn!(%index, model = %kind, error = %e, "candidate failed");
                    (CandidateScore::failed(kind, e.to_string()), None)
                }
            };
            debug!(%index, model = %kind, rmse = score.rmse, "scored candidate");
            scores.push(score);
            fits.push(fit);
        }

        // Strict comparison keeps the earliest candidate on ties
        let mut best: Option<(usize, f64)> = None;
        for (position, score) in scores.iter().enumerate().filter(|(_, s)| s.is_valid()) {
            if best.map_or(true, |(_, rmse)| score.rmse < rmse) {
                best = Some((position, score.rmse));
            }
        }
        let Some((position, rmse)) = best else {
            return Err(ForecastError::AllModelsFailed { index });
        };
        let Some(fitted) = fits.swap_remove(position) else {
            return Err(ForecastError::AllModelsFailed { index });
        };

        let selection = Selection {
            winner: scores[position].model,
            rmse,
            scores,
            fitted,
        };
        info!(%index, winner = %selection.winner, rmse = selection.rmse, "selected model");
        Ok(selection)
    }
}

fn evaluate(
    candidate: &dyn ForecastModel,
    train: &ModelInput<'_>,
    targets: &[f64],
    test: &ModelInput<'_>,
    actual: &[f64],
) -> Result<(f64, Box<dyn TrainedForecastModel>)> {
    let trained = candidate.fit(train, targets)?;
    let predicted = trained.predict(test)?;
    if predicted.len() != actual.len() {
        return Err(ForecastError::candidate(
            candidate.kind(),
            format!(
                "predicted {} values for {} test rows",
                predicted.len(),
                actual.len()
            ),
        ));
    }
    Ok((rmse(&predicted, actual), trained))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForecastConfig;

    fn axis(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| {
                NaiveDate::from_ymd_opt(2019 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_selects_a_finite_winner() {
        let config = ForecastConfig::default();
        let pool = CandidatePool::from_config(&config);
        let selector = ModelSelector::new(&pool, &config.selection);

        let dates = axis(24);
        let values: Vec<f64> = (0..24).map(|i| i as f64 / 23.0).collect();
        let selection = selector.select(IndexName::Ndvi, &dates, &values).unwrap();

        assert!(selection.rmse.is_finite());
        assert_eq!(selection.scores.len(), 4);
        let winner_score = selection
            .scores
            .iter()
            .find(|s| s.model == selection.winner)
            .unwrap();
        assert_eq!(winner_score.rmse, selection.rmse);
        assert!(selection.scores.iter().all(|s| s.rmse >= selection.rmse));
        assert_eq!(selection.fitted.kind(), selection.winner);
    }

    #[test]
    fn test_too_few_points() {
        let config = ForecastConfig::default();
        let pool = CandidatePool::from_config(&config);
        let selector = ModelSelector::new(&pool, &config.selection);

        let dates = axis(8);
        let err = selector
            .select(IndexName::Lst, &dates, &[0.5; 8])
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                index: IndexName::Lst,
                available: 8,
                required: 12
            }
        ));
    }

    #[test]
    fn test_exhausted_budget_fails_every_candidate() {
        let config = ForecastConfig::default().with_time_budget(Some(std::time::Duration::ZERO));
        let pool = CandidatePool::from_config(&config);
        let selector = ModelSelector::new(&pool, &config.selection);

        let dates = axis(12);
        let err = selector
            .select(IndexName::Ndwi, &dates, &[0.2; 12])
            .unwrap_err();
        assert!(matches!(err, ForecastError::AllModelsFailed { index: IndexName::Ndwi }));
    }

    #[test]
    fn test_negative_budget_is_an_error() {
        let mut config = ForecastConfig::default();
        config.selection.time_budget_secs = Some(-1.0);
        let pool = CandidatePool::from_config(&config);
        let selector = ModelSelector::new(&pool, &config.selection);

        let err = selector
            .select(IndexName::Ndvi, &axis(12), &[0.2; 12])
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));
    }
}
