//! Constant imputer.
//!
//! Replaces every `NaN` with a fixed value (0 by default). The bulk feature
//! paths run it right before scaling.

use crate::features::FeatureColumn;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::table::FeatureTable;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted ConstantImputer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantImputerParams {
    pub fill_value: f64,
    pub columns: Vec<FeatureColumn>,
}

/// ConstantImputer transformer (unfitted).
#[derive(Clone, Debug)]
pub struct ConstantImputer {
    fill_value: f64,
}

impl Default for ConstantImputer {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ConstantImputer {
    pub fn new(fill_value: f64) -> Self {
        Self { fill_value }
    }
}

impl Transformer for ConstantImputer {
    type Input = FeatureTable;
    type Output = FeatureTable;
    type Params = ConstantImputerParams;
    type Fitted = FittedConstantImputer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.n_rows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit ConstantImputer on empty data".to_string(),
            ));
        }

        Ok(FittedConstantImputer {
            fill_value: self.fill_value,
            columns: data.columns().to_vec(),
        })
    }
}

/// Fitted ConstantImputer ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedConstantImputer {
    fill_value: f64,
    columns: Vec<FeatureColumn>,
}

impl FittedConstantImputer {
    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }
}

impl FittedTransformer for FittedConstantImputer {
    type Input = FeatureTable;
    type Output = FeatureTable;
    type Params = ConstantImputerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        if data.columns() != self.columns.as_slice() {
            return Err(PreprocessingError::ColumnMismatch {
                expected: self.columns.clone(),
                got: data.columns().to_vec(),
            });
        }

        let fill = self.fill_value;
        let filled = data.values().mapv(|v| if v.is_nan() { fill } else { v });
        Ok(data.with_values(filled))
    }

    fn inverse_transform(&self, _data: &Self::Output) -> Result<Self::Input, PreprocessingError> {
        Err(PreprocessingError::Unsupported(
            "ConstantImputer cannot restore missing values",
        ))
    }

    fn extract_params(&self) -> Self::Params {
        ConstantImputerParams {
            fill_value: self.fill_value,
            columns: self.columns.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(Self {
            fill_value: params.fill_value,
            columns: params.columns,
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }
}
