//! Additive trend + yearly seasonality model
//!
//! `y(t) = g(t) + s(t)` where `g` is a piecewise-linear trend with hinge
//! changepoints spread over the early part of the history and `s` is a
//! yearly Fourier series. Coefficients come from penalized least squares:
//! changepoint and seasonal terms are shrunk according to their prior
//! scales, intercept and base slope are left (almost) free.
//!
//! The model consumes dates directly and can predict any date, including
//! month starts beyond the observed history.

use crate::config::SeasonalConfig;
use crate::error::{ForecastError, Result};
use crate::models::{check_training_data, ForecastModel, ModelInput, ModelKind, TrainedForecastModel};
use chrono::NaiveDate;
use index_math::linalg::penalized_least_squares;
use std::f64::consts::PI;

/// Days per year used by the seasonal period
const YEAR_DAYS: f64 = 365.25;

/// Near-zero penalty on the base slope keeps the system well-posed
const SLOPE_PENALTY: f64 = 1e-6;

/// Trend + seasonality candidate
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    config: SeasonalConfig,
}

/// Fitted trend + seasonality model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalTrend {
    start: NaiveDate,
    span_days: f64,
    yearly_order: usize,
    /// Changepoint locations on the scaled time axis
    changepoints: Vec<f64>,
    coefficients: Vec<f64>,
}

impl SeasonalTrend {
    /// Create a new seasonal model from its configuration
    pub fn new(config: SeasonalConfig) -> Self {
        Self { config }
    }

    /// Changepoints at evenly spaced observations within the changepoint range
    fn changepoints(&self, scaled_times: &[f64]) -> Vec<f64> {
        let history = (scaled_times.len() as f64 * self.config.changepoint_range).floor() as usize;
        if history < 2 || self.config.n_changepoints == 0 {
            return Vec::new();
        }
        let count = self.config.n_changepoints.min(history - 1);

        let mut points: Vec<f64> = (1..=count)
            .map(|i| {
                let position = (i as f64 * (history - 1) as f64 / count as f64).round() as usize;
                scaled_times[position]
            })
            .collect();
        points.dedup();
        points
    }
}

impl ForecastModel for SeasonalTrend {
    fn fit(&self, input: &ModelInput<'_>, targets: &[f64]) -> Result<Box<dyn TrainedForecastModel>> {
        let kind = self.kind();
        check_training_data(kind, input, targets)?;

        let dates = input.dates();
        if dates.len() < 2 {
            return Err(ForecastError::candidate(kind, "needs at least two observations"));
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::candidate(
                kind,
                "malformed date axis: dates must be strictly increasing",
            ));
        }

        let start = dates[0];
        let span_days = (dates[dates.len() - 1] - start).num_days() as f64;
        let scaled_times: Vec<f64> = dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();

        let mut model = TrainedSeasonalTrend {
            start,
            span_days,
            yearly_order: self.config.yearly_order,
            changepoints: self.changepoints(&scaled_times),
            coefficients: Vec::new(),
        };

        let design: Vec<Vec<f64>> = dates.iter().map(|d| model.design_row(*d)).collect();

        let changepoint_penalty = 1.0 / self.config.changepoint_prior_scale.powi(2);
        let seasonal_penalty = 1.0 / self.config.seasonality_prior_scale.powi(2);
        let mut penalties = vec![0.0, SLOPE_PENALTY];
        penalties.extend(std::iter::repeat(changepoint_penalty).take(model.changepoints.len()));
        penalties.extend(std::iter::repeat(seasonal_penalty).take(2 * model.yearly_order));

        model.coefficients = penalized_least_squares(&design, targets, &penalties)
            .map_err(|e| ForecastError::candidate(kind, e.to_string()))?;

        Ok(Box::new(model))
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Seasonal
    }
}

impl TrainedSeasonalTrend {
    /// Regressors for one date: intercept, slope, hinges, Fourier pairs
    fn design_row(&self, date: NaiveDate) -> Vec<f64> {
        let days = (date - self.start).num_days() as f64;
        let t = days / self.span_days;

        let mut row = Vec::with_capacity(2 + self.changepoints.len() + 2 * self.yearly_order);
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&c| (t - c).max(0.0)));
        for k in 1..=self.yearly_order {
            let angle = 2.0 * PI * k as f64 * days / YEAR_DAYS;
            row.push(angle.sin());
            row.push(angle.cos());
        }
        row
    }

    /// Linear-trend and seasonal contributions for a date
    pub fn components(&self, date: NaiveDate) -> (f64, f64) {
        let row = self.design_row(date);
        let trend_terms = 2 + self.changepoints.len();
        let dot = |range: std::ops::Range<usize>| -> f64 {
            range.map(|i| row[i] * self.coefficients[i]).sum()
        };
        (dot(0..trend_terms), dot(trend_terms..row.len()))
    }
}

impl TrainedForecastModel for TrainedSeasonalTrend {
    fn predict(&self, input: &ModelInput<'_>) -> Result<Vec<f64>> {
        Ok(input
            .dates()
            .iter()
            .map(|&date| {
                let (trend, seasonal) = self.components(date);
                trend + seasonal
            })
            .collect())
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Seasonal
    }
}
