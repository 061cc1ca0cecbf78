//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation. Constant columns get `s = 1`.
//!
//! The fitted scaler remembers the ordered columns it was fit on and refuses
//! any table whose columns differ in set or order.
//!
//! # Example
//! ```ignore
//! use reservation_cancel::preprocessing::{FittedTransformer, StandardScaler, Transformer};
//!
//! let fitted = StandardScaler::new().fit(&train)?;
//! let scaled = fitted.transform(&train)?;
//! let new_scaled = fitted.transform(&new_table)?;
//! ```

use crate::features::FeatureColumn;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::table::FeatureTable;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Ordered columns seen during fit.
    pub columns: Vec<FeatureColumn>,
    /// Mean of each feature.
    pub mean: Vec<f64>,
    /// Population standard deviation of each feature, 1 for constant ones.
    pub std: Vec<f64>,
}

/// StandardScaler transformer (unfitted). Always centres and scales.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for StandardScaler {
    type Input = FeatureTable;
    type Output = FeatureTable;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.n_rows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let missing = data.columns_with_missing();
        if !missing.is_empty() {
            return Err(PreprocessingError::MissingValues(format!(
                "StandardScaler cannot be fit on NaN in {:?}",
                missing
            )));
        }

        let mean = data
            .values()
            .mean_axis(Axis(0))
            .ok_or_else(|| PreprocessingError::EmptyData("no rows to average".to_string()))?;

        // Population std (ddof=0); constant features keep their scale.
        let std = data
            .values()
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(FittedStandardScaler {
            columns: data.columns().to_vec(),
            mean,
            std,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedStandardScaler {
    columns: Vec<FeatureColumn>,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    /// Columns the scaler was fit on, in order.
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    fn check_columns(&self, data: &FeatureTable) -> Result<(), PreprocessingError> {
        if data.columns() != self.columns.as_slice() {
            return Err(PreprocessingError::ColumnMismatch {
                expected: self.columns.clone(),
                got: data.columns().to_vec(),
            });
        }
        Ok(())
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = FeatureTable;
    type Output = FeatureTable;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        self.check_columns(data)?;

        let mut result = data.values().clone();
        result -= &self.mean;
        result /= &self.std;

        Ok(data.with_values(result))
    }

    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input, PreprocessingError> {
        self.check_columns(data)?;

        let mut result = data.values().clone();
        result *= &self.std;
        result += &self.mean;

        Ok(data.with_values(result))
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            columns: self.columns.clone(),
            mean: self.mean.to_vec(),
            std: self.std.to_vec(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        let n = params.columns.len();
        if params.mean.len() != n || params.std.len() != n {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} means and stds", n),
                got: format!("{} means, {} stds", params.mean.len(), params.std.len()),
            });
        }

        Ok(Self {
            columns: params.columns,
            mean: Array1::from(params.mean),
            std: Array1::from(params.std),
        })
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }
}
