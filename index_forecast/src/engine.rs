//! Refit the selected model on the full series and project it forward

use crate::cleaning::{apply_validity_floor, PreparedSeries};
use crate::config::ForecastConfig;
use crate::data::{IndexSeries, TimeSeriesPoint};
use crate::error::{ForecastError, Result};
use crate::features::{build_features, future_month_starts};
use crate::models::{CandidatePool, ModelInput, ModelKind};
use crate::report::ForecastReport;
use crate::selection::ModelSelector;
use index_math::stats::{round_to, sanitize};
use tracing::{info, warn};

/// Runs the single-index pipeline: clean, select, refit, forecast
#[derive(Debug)]
pub struct ForecastEngine {
    config: ForecastConfig,
    pool: CandidatePool,
}

impl ForecastEngine {
    /// Engine with the four default candidates built from `config`
    pub fn new(config: ForecastConfig) -> Self {
        let pool = CandidatePool::from_config(&config);
        Self { config, pool }
    }

    /// Engine with an explicit candidate pool
    pub fn with_pool(config: ForecastConfig, pool: CandidatePool) -> Self {
        Self { config, pool }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    /// Forecast one index series
    pub fn forecast_series(&self, series: &IndexSeries) -> Result<ForecastReport> {
        let index = series.index();
        let series = apply_validity_floor(series, &self.config.cleaning);
        let required = self.config.selection.min_points;
        if series.len() < required {
            return Err(ForecastError::InsufficientData {
                index,
                available: series.len(),
                required,
            });
        }

        let prepared = PreparedSeries::prepare(&series, &self.config.cleaning)?;
        let selection = ModelSelector::new(&self.pool, &self.config.selection).select(
            index,
            prepared.dates(),
            prepared.scaled(),
        )?;

        // Winner first; if its full refit fails, fall back by hold-out score
        let mut ranked: Vec<_> = selection.scores.iter().filter(|s| s.is_valid()).collect();
        ranked.sort_by(|a, b| a.rmse.total_cmp(&b.rmse));

        let mut first_error = None;
        for score in ranked {
            match self.refit_and_forecast(&prepared, score.model) {
                Ok(future) => {
                    info!(
                        %index,
                        model = %score.model,
                        rmse = score.rmse,
                        points = prepared.len(),
                        "forecast complete"
                    );
                    return Ok(ForecastReport {
                        model_used: score.model.name().to_string(),
                        accuracy_score: round_to(score.rmse, self.config.selection.decimals),
                        history: prepared.history(),
                        future,
                    });
                }
                Err(e) => {
                    warn!(
                        %index,
                        model = %score.model,
                        error = %e,
                        "refit failed, trying next candidate"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or(ForecastError::AllModelsFailed { index }))
    }

    /// Refit `kind` on every point and predict the future months
    pub fn refit_and_forecast(
        &self,
        prepared: &PreparedSeries,
        kind: ModelKind,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let index = prepared.index();
        let Some(&last) = prepared.dates().last() else {
            return Err(ForecastError::InsufficientData {
                index,
                available: 0,
                required: self.config.selection.min_points,
            });
        };
        let model = self.pool.get(kind).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("{} is not in the candidate pool", kind))
        })?;

        let history_features = build_features(prepared.dates());
        let trained = model.fit(
            &ModelInput::new(prepared.dates(), &history_features)?,
            prepared.scaled(),
        )?;

        // Future rows continue the history's time index
        let future_dates = future_month_starts(last, self.config.selection.horizon);
        let mut axis = prepared.dates().to_vec();
        axis.extend(&future_dates);
        let features = build_features(&axis);
        let offset = prepared.len();
        let scaled = trained.predict(&ModelInput::new(&axis[offset..], &features[offset..])?)?;
        if scaled.len() != future_dates.len() {
            return Err(ForecastError::candidate(
                kind,
                format!(
                    "predicted {} values for {} future months",
                    scaled.len(),
                    future_dates.len()
                ),
            ));
        }

        let decimals = self.config.selection.decimals;
        let values = prepared.context().inverse(&scaled);
        let non_finite = values.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(%index, non_finite, "replacing non-finite forecast values with 0.0");
        }

        Ok(future_dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| TimeSeriesPoint {
                date,
                value: round_to(sanitize(value, 0.0), decimals),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IndexName;
    use crate::models::{ForecastModel, TrainedForecastModel};
    use chrono::NaiveDate;

    fn monthly(index: IndexName, values: &[f64]) -> IndexSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| TimeSeriesPoint {
                date: NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 1)
                    .unwrap(),
                value,
            })
            .collect();
        IndexSeries::from_points(index, points)
    }

    #[test]
    fn test_future_axis_and_rounding() {
        let values: Vec<f64> = (0..24).map(|i| 0.3 + 0.4 * i as f64 / 23.0).collect();
        let engine = ForecastEngine::new(ForecastConfig::default());
        let report = engine.forecast_series(&monthly(IndexName::Ndvi, &values)).unwrap();

        assert_eq!(report.history.len(), 24);
        assert_eq!(report.future.len(), 12);
        assert_eq!(
            report.future[0].date,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert_eq!(
            report.future[11].date,
            NaiveDate::from_ymd_opt(2022, 12, 1).unwrap()
        );
        for point in &report.future {
            assert!(point.value.is_finite());
            assert_eq!(point.value, round_to(point.value, 4));
        }
        assert_eq!(report.accuracy_score, round_to(report.accuracy_score, 4));
    }

    #[test]
    fn test_validity_floor_can_starve_a_series() {
        let mut values = vec![0.5; 14];
        values[0] = 0.01;
        values[1] = 0.02;
        values[2] = 0.03;
        let config = ForecastConfig {
            cleaning: crate::config::CleaningConfig::cloud_filter(),
            ..ForecastConfig::default()
        };
        let engine = ForecastEngine::new(config);

        let err = engine
            .forecast_series(&monthly(IndexName::Ndwi, &values))
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                available: 11,
                required: 12,
                ..
            }
        ));
    }

    /// Predicts a constant; refuses to fit more than `max_rows` rows
    #[derive(Debug, Clone, Copy)]
    struct CappedModel {
        kind: ModelKind,
        value: f64,
        max_rows: usize,
    }

    impl ForecastModel for CappedModel {
        fn fit(
            &self,
            input: &ModelInput<'_>,
            _targets: &[f64],
        ) -> Result<Box<dyn TrainedForecastModel>> {
            if input.len() > self.max_rows {
                return Err(ForecastError::candidate(self.kind, "too many rows"));
            }
            Ok(Box::new(*self))
        }

        fn kind(&self) -> ModelKind {
            self.kind
        }
    }

    impl TrainedForecastModel for CappedModel {
        fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<f64>> {
            Ok(vec![self.value; input.len()])
        }

        fn kind(&self) -> ModelKind {
            self.kind
        }
    }

    #[test]
    fn test_failed_refit_falls_back_to_next_best() {
        // Constant series scales to 0.0: the first candidate is exact on the
        // hold-out but cannot be refit on all 24 rows
        let candidates: Vec<Box<dyn ForecastModel>> = vec![
            Box::new(CappedModel {
                kind: ModelKind::Seasonal,
                value: 0.0,
                max_rows: 18,
            }),
            Box::new(CappedModel {
                kind: ModelKind::RandomForest,
                value: 0.3,
                max_rows: usize::MAX,
            }),
        ];
        let engine = ForecastEngine::with_pool(
            ForecastConfig::default(),
            CandidatePool::with_candidates(candidates).unwrap(),
        );

        let report = engine.forecast_series(&monthly(IndexName::Ndvi, &[0.5; 24])).unwrap();
        assert_eq!(report.model_used, "random_forest");
        assert_eq!(report.accuracy_score, 0.3);
        assert!(report.future.iter().all(|p| p.value == 0.5));
    }

    #[test]
    fn test_every_refit_failing_reports_the_winner_error() {
        let candidates: Vec<Box<dyn ForecastModel>> = vec![Box::new(CappedModel {
            kind: ModelKind::GradientBoostingDepthwise,
            value: 0.0,
            max_rows: 18,
        })];
        let engine = ForecastEngine::with_pool(
            ForecastConfig::default(),
            CandidatePool::with_candidates(candidates).unwrap(),
        );

        let err = engine.forecast_series(&monthly(IndexName::Ndbi, &[0.5; 24])).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::CandidateTraining {
                model: ModelKind::GradientBoostingDepthwise,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_budget_is_an_error_not_a_panic() {
        let mut config = ForecastConfig::default();
        config.selection.time_budget_secs = Some(-1.0);
        let engine = ForecastEngine::new(config);

        let values: Vec<f64> = (0..24).map(|i| i as f64 / 23.0).collect();
        let err = engine.forecast_series(&monthly(IndexName::Lst, &values)).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));
    }

    #[test]
    fn test_custom_horizon() {
        let values: Vec<f64> = (0..18).map(|i| (i % 12) as f64).collect();
        let engine = ForecastEngine::new(ForecastConfig::default().with_horizon(3));
        let report = engine.forecast_series(&monthly(IndexName::Lst, &values)).unwrap();
        assert_eq!(report.future.len(), 3);
    }
}
