//! Forecast every index from one data source

use crate::config::ForecastConfig;
use crate::data::{DataSource, IndexName, IndexSeries, Observation};
use crate::engine::ForecastEngine;
use crate::error::Result;
use crate::report::{ForecastReport, ForecastSummary, IndexOutcome};
use tracing::{info, info_span, warn};

/// Multi-index driver around a [`ForecastEngine`]
#[derive(Debug)]
pub struct Orchestrator {
    engine: ForecastEngine,
}

impl Orchestrator {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            engine: ForecastEngine::new(config),
        }
    }

    pub fn with_engine(engine: ForecastEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Forecast all four indices.
    ///
    /// Loading failures abort the request. After that each index is
    /// independent: its error is recorded in its own entry and the others
    /// still run, so the summary always holds all four indices.
    pub fn run(&self, source: &dyn DataSource) -> Result<ForecastSummary> {
        let rows = source.load()?;
        info!(rows = rows.len(), "loaded observations");

        let mut summary = ForecastSummary::new();
        for index in IndexName::ALL {
            let outcome: IndexOutcome = self.forecast_rows(&rows, index).into();
            if let Some(error) = outcome.error() {
                warn!(%index, error, "index forecast failed");
            }
            summary.insert(index, outcome);
        }

        info!(
            succeeded = summary.succeeded(),
            total = summary.len(),
            "forecast run finished"
        );
        Ok(summary)
    }

    /// Forecast a single index; any failure is returned as the error
    pub fn forecast_index(&self, source: &dyn DataSource, index: IndexName) -> Result<ForecastReport> {
        let rows = source.load()?;
        self.forecast_rows(&rows, index)
    }

    fn forecast_rows(&self, rows: &[Observation], index: IndexName) -> Result<ForecastReport> {
        let span = info_span!("index", %index);
        span.in_scope(|| {
            let series = IndexSeries::from_observations(index, rows);
            self.engine.forecast_series(&series)
        })
    }
}
