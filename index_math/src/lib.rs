//! # Index Math
//!
//! Numeric building blocks for forecasting environmental indices.
//! This crate provides the small, dependency-light calculations the
//! forecasting pipeline is assembled from:
//! - Quantiles, RMSE and rounding helpers
//! - Interquartile-range outlier fences
//! - Min-max scaling with an inverse transform
//! - Penalized least squares

use thiserror::Error;

pub mod linalg;
pub mod outliers;
pub mod scaling;
pub mod stats;

pub use outliers::IqrFence;
pub use scaling::MinMaxScaler;

/// Errors that can occur in index calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for index math operations
pub type Result<T> = std::result::Result<T, MathError>;
