//! Imputation transformers for handling missing values.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`ConstantImputer`] | Replace `NaN` with a constant |

pub mod constant;

pub use constant::{ConstantImputer, ConstantImputerParams, FittedConstantImputer};
