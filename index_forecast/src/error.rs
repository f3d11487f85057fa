//! Error types for the index_forecast crate

use crate::data::IndexName;
use crate::models::ModelKind;
use index_math::MathError;
use thiserror::Error;

/// Custom error types for the index_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The upstream dataset does not exist
    #[error("Dataset not found: {0}")]
    SourceUnavailable(String),

    /// Too few usable observations for an index after cleaning
    #[error("Insufficient data for {index}: {available} usable points, at least {required} required")]
    InsufficientData {
        index: IndexName,
        available: usize,
        required: usize,
    },

    /// A single candidate model could not be trained or evaluated
    #[error("{model} failed: {reason}")]
    CandidateTraining { model: ModelKind, reason: String },

    /// Every candidate model failed for an index
    #[error("All candidate models failed for {index}")]
    AllModelsFailed { index: IndexName },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A value in the source could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numeric primitives
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV reader or writer
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ForecastError {
    /// Shorthand for a candidate training failure
    pub fn candidate(model: ModelKind, reason: impl Into<String>) -> Self {
        ForecastError::CandidateTraining {
            model,
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the whole multi-index request
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ForecastError::SourceUnavailable(_)
                | ForecastError::ParseError(_)
                | ForecastError::IoError(_)
                | ForecastError::CsvError(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
