//! Serializable forecast results

use crate::data::{IndexName, TimeSeriesPoint};
use crate::error::ForecastError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forecast of one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Identifier of the winning candidate
    pub model_used: String,
    /// Hold-out RMSE of the winner, in scaled units
    pub accuracy_score: f64,
    /// Cleaned (clipped, unscaled) observations
    pub history: Vec<TimeSeriesPoint>,
    /// One point per future month
    pub future: Vec<TimeSeriesPoint>,
}

/// Per-index entry of the aggregate: a report or an error marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexOutcome {
    Report(ForecastReport),
    Error { error: String },
}

impl IndexOutcome {
    pub fn report(&self) -> Option<&ForecastReport> {
        match self {
            IndexOutcome::Report(report) => Some(report),
            IndexOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            IndexOutcome::Report(_) => None,
            IndexOutcome::Error { error } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

impl From<Result<ForecastReport, ForecastError>> for IndexOutcome {
    fn from(result: Result<ForecastReport, ForecastError>) -> Self {
        match result {
            Ok(report) => IndexOutcome::Report(report),
            Err(e) => IndexOutcome::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Aggregate over all four indices, keyed by index name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSummary {
    outcomes: BTreeMap<IndexName, IndexOutcome>,
}

impl ForecastSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: IndexName, outcome: IndexOutcome) {
        self.outcomes.insert(index, outcome);
    }

    pub fn get(&self, index: IndexName) -> Option<&IndexOutcome> {
        self.outcomes.get(&index)
    }

    /// Entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (IndexName, &IndexOutcome)> {
        self.outcomes.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of indices that produced a report
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| !o.is_error()).count()
    }
}
