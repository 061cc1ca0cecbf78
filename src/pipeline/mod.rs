//! Feature pipeline orchestration.
//!
//! The pipeline turns reservation rows into the scaled matrix the classifier
//! consumes. It follows the same type-state split as the transformers:
//! [`FeaturePipeline`] is consumed by `fit_transform`, which records the user
//! history and fits the imputer and scaler, and yields a
//! [`FittedFeaturePipeline`] whose transforms are read-only.

pub mod pipeline;

pub use pipeline::{
    AugmentedRow, FeaturePipeline, FittedFeaturePipeline, PipelineParams, TransformOutput,
};

use crate::features::FeatureError;
use crate::preprocessing::PreprocessingError;
use thiserror::Error;

/// Error raised while building the feature matrix.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("{rows} training rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },

    /// Training labels must be exactly 0 or 1.
    #[error("label at row {index} is {value}, expected 0 or 1")]
    InvalidLabel { index: usize, value: f64 },

    #[error("cannot fit the pipeline on zero rows")]
    EmptyTrainingSet,
}
