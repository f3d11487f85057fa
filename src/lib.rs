//! # envcast
//!
//! Workspace facade for environmental index forecasting.
//!
//! - [`index_math`]: quantiles, IQR outlier fences, min-max scaling, RMSE
//!   and penalized least squares
//! - [`index_forecast`]: data sources, candidate models, hold-out model
//!   selection and the multi-index forecast pipeline
//!
//! ## Example
//!
//! ```
//! use envcast_workspace::index_forecast::{ForecastConfig, IndexName};
//!
//! let config = ForecastConfig::default();
//! assert_eq!(config.selection.horizon, 12);
//! assert_eq!(IndexName::ALL.len(), 4);
//! ```

pub use index_forecast;
pub use index_math;

/// Workspace version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
