//! Error types for preprocessing operations.

use crate::features::FeatureColumn;
use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Parameters or arrays have inconsistent shapes.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
    /// Data contains missing values (NaN) when not expected.
    #[error("Missing values: {0}")]
    MissingValues(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// The columns of the input differ in set or order from the fitted columns.
    #[error("Column mismatch: fitted on {expected:?}, got {got:?}")]
    ColumnMismatch {
        expected: Vec<FeatureColumn>,
        got: Vec<FeatureColumn>,
    },
    /// The transformer does not support the operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}
