//! # Index Forecast
//!
//! Model-selection forecasting for monthly satellite-derived environmental
//! indices (NDVI, NDWI, NDBI, LST).
//!
//! ## Features
//!
//! - Tabular data sources (CSV store, in-memory rows)
//! - IQR outlier clipping and min-max scaling per index
//! - Four competing candidates: trend + yearly seasonality, random forest
//!   and two gradient boosting variants
//! - Hold-out selection by RMSE with a deterministic tie-break
//! - Refit on the full history and a 12-month forecast in physical units
//! - Per-index error isolation across a multi-index run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use index_forecast::{CsvStore, ForecastConfig, Orchestrator};
//!
//! let store = CsvStore::new("indices.csv");
//! let orchestrator = Orchestrator::new(ForecastConfig::default());
//! let summary = orchestrator.run(&store)?;
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! # Ok::<(), index_forecast::ForecastError>(())
//! ```

pub mod cleaning;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod selection;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{CsvStore, DataSource, IndexName, IndexSeries, MemorySource, Observation, TimeSeriesPoint};
pub use crate::engine::ForecastEngine;
pub use crate::error::{ForecastError, Result};
pub use crate::models::{CandidatePool, ForecastModel, ModelKind, TrainedForecastModel};
pub use crate::orchestrator::Orchestrator;
pub use crate::report::{ForecastReport, ForecastSummary, IndexOutcome};
pub use crate::selection::{ModelSelector, Selection};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
