//! Data preprocessing transformers.
//!
//! Transformers follow the same type-state pattern as the models in this
//! crate: an unfitted [`Transformer`] carries hyperparameters, and fitting it
//! yields a [`FittedTransformer`] that can transform new data. Fitted
//! parameters are persisted only inside the model artifact.
//!
//! All transformers here operate on a [`FeatureTable`], which keeps the
//! ordered column names next to the values so a fitted transformer can reject
//! input whose columns differ from what it was fit on.
//!
//! # Example
//!
//! ```ignore
//! use reservation_cancel::preprocessing::{ConstantImputer, StandardScaler, Transformer, FittedTransformer};
//!
//! let (imputer, filled) = ConstantImputer::default().fit_transform(&table)?;
//! let (scaler, scaled) = StandardScaler::new().fit_transform(&filled)?;
//!
//! let scaled_test = scaler.transform(&imputer.transform(&test_table)?)?;
//! ```

pub mod error;
pub mod imputation;
pub mod scaling;
pub mod table;
pub mod traits;

pub use error::PreprocessingError;
pub use imputation::{ConstantImputer, ConstantImputerParams, FittedConstantImputer};
pub use scaling::{
    FittedStandardScaler, StandardScaler, StandardScalerParams,
};
pub use table::FeatureTable;
pub use traits::{FittedTransformer, Transformer};
