//! Errors of the model layer.

use crate::dataset::DatasetError;
use crate::pipeline::PipelineError;
use crate::trainer::TrainingError;
use std::io;
use thiserror::Error;

/// Error raised while fitting, scoring or persisting a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("training failed: {0}")]
    Training(#[from] TrainingError),

    #[error("invalid training data: {0}")]
    Dataset(#[from] DatasetError),

    #[error("model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("{rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("no rows to score")]
    EmptyInput,

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
