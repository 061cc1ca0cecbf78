//! Error types for the data layer.

use thiserror::Error;

/// Error raised while reading raw reservation tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// A CSV file could not be parsed or a record could not be deserialized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised while resolving the time zone of a pickup location.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The location is not known to the lookup.
    #[error("unknown location: {0}")]
    UnknownLocation(i64),
}
