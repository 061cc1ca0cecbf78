//! Logistic regression over the scaled feature matrix.
//!
//! [`LogisticRegression`] holds the SGD hyperparameters and trains through
//! [`Trainer`] on binary cross-entropy; the result is a
//! [`FittedLogisticRegression`] that only predicts.
//!
//! ```
//! use ndarray::array;
//! use reservation_cancel::model::{Classifier, LogisticRegression, ProbabilisticClassifier};
//!
//! let x = array![[-1.0], [-0.5], [0.5], [1.0]];
//! let y = array![0.0, 0.0, 1.0, 1.0];
//! let fitted = LogisticRegression::new().learning_rate(0.5).max_epochs(200).fit(&x, &y)?;
//! let proba = fitted.predict_proba(&array![[2.0]])?;
//! assert!(proba[0] > 0.5);
//! # Ok::<(), reservation_cancel::model::ModelError>(())
//! ```

use crate::config::ModelConfig;
use crate::dataset::InMemoryDataset;
use crate::loss::{sigmoid, BCEWithLogitsLoss};
use crate::model::{
    Classifier, Fitted, ModelError, ParamOps, ProbabilisticClassifier, TrainableModel, Unfitted,
};
use crate::optimizer::SGD;
use crate::regularizers::{NoRegularizer, L2};
use crate::trainer::Trainer;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Weights and intercept of a logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

impl ParamOps for LogisticParams {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: &self.weights + &other.weights,
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, scalar: f64) -> Self {
        Self {
            weights: &self.weights * scalar,
            bias: self.bias * scalar,
        }
    }
}

/// Linear model over logits, `z = x·w + b`.
///
/// The state parameter separates the trainable form from the fitted one;
/// see [`Unfitted`] and [`Fitted`].
#[derive(Debug, Clone)]
pub struct LogisticModel<S> {
    params: LogisticParams,
    _state: PhantomData<S>,
}

impl<S> LogisticModel<S> {
    pub fn params(&self) -> &LogisticParams {
        &self.params
    }
}

pub type LogisticRegressionModel = LogisticModel<Unfitted>;
pub type FittedLogisticRegression = LogisticModel<Fitted>;

impl LogisticRegressionModel {
    /// Zero-initialized model over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LogisticParams {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        })
    }

    pub fn from_params(params: LogisticParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

impl TrainableModel for LogisticRegressionModel {
    type Input = Array2<f64>;
    type Prediction = Array1<f64>;
    type Params = LogisticParams;
    type Gradients = LogisticParams;
    type Output = FittedLogisticRegression;

    fn forward(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.params.weights) + self.params.bias
    }

    fn backward(&self, x: &Array2<f64>, grad_output: &Array1<f64>) -> LogisticParams {
        LogisticParams {
            weights: x.t().dot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &LogisticParams {
        &self.params
    }

    fn update_params(&mut self, new_params: &LogisticParams) {
        self.params = new_params.clone();
    }

    fn into_fitted(self) -> FittedLogisticRegression {
        FittedLogisticRegression::new(self.params)
    }
}

impl FittedLogisticRegression {
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    /// Raw logits for each row.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let expected = self.params.weights.len();
        if x.ncols() != expected {
            return Err(ModelError::FeatureMismatch {
                expected,
                got: x.ncols(),
            });
        }
        Ok(x.dot(&self.params.weights) + self.params.bias)
    }
}

impl ProbabilisticClassifier for FittedLogisticRegression {
    type Params = LogisticParams;

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    fn n_features(&self) -> usize {
        self.params.weights.len()
    }

    fn extract_params(&self) -> LogisticParams {
        self.params.clone()
    }

    fn from_params(params: LogisticParams) -> Result<Self, ModelError> {
        Ok(Self::new(params))
    }
}

/// Logistic regression trained with mini-batch SGD on binary cross-entropy.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    /// Ridge strength; 0 trains without a penalty.
    pub l2: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_epochs: 500,
            batch_size: 64,
            l2: 0.0,
        }
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            max_epochs: config.max_epochs,
            batch_size: config.batch_size,
            l2: config.l2,
        }
    }

    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn l2(mut self, lambda: f64) -> Self {
        self.l2 = lambda;
        self
    }
}

impl Classifier for LogisticRegression {
    type Fitted = FittedLogisticRegression;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedLogisticRegression, ModelError> {
        let dataset = InMemoryDataset::new(x.clone(), y.clone())?;
        let model = LogisticRegressionModel::new(dataset.n_features());
        let optimizer = SGD::new(self.learning_rate);

        let fitted = if self.l2 > 0.0 {
            Trainer::builder(BCEWithLogitsLoss, optimizer, L2::new(self.l2))
                .batch_size(self.batch_size)
                .max_epochs(self.max_epochs)
                .build()
                .fit(model, &dataset)?
        } else {
            Trainer::builder(BCEWithLogitsLoss, optimizer, NoRegularizer)
                .batch_size(self.batch_size)
                .max_epochs(self.max_epochs)
                .build()
                .fit(model, &dataset)?
        };
        Ok(fitted)
    }
}
