//! Models: the trainable logistic regression and the end-to-end
//! cancellation model that pairs it with the feature pipeline.

use ndarray::{Array1, Array2};
use serde::{de::DeserializeOwned, Serialize};

pub mod cancellation;
pub mod error;
pub mod logistic;
pub mod state;

pub use cancellation::{classify, CancellationModel, ModelArtifact};
pub use error::ModelError;
pub use logistic::{
    FittedLogisticRegression, LogisticParams, LogisticRegression, LogisticRegressionModel,
};
pub use state::{Fitted, Unfitted};

/// A model that can be optimized by [`crate::trainer::Trainer`].
pub trait TrainableModel {
    type Input;
    type Prediction;
    type Params;
    type Gradients;
    type Output;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);

    /// Consume the trainable model and keep only what inference needs.
    fn into_fitted(self) -> Self::Output;
}

/// Arithmetic the optimizer needs on a parameter set.
pub trait ParamOps: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, scalar: f64) -> Self;
}

/// Untrained binary classifier with its hyperparameters.
///
/// The cancellation model is generic over this seam, so any estimator that
/// produces probabilities can be plugged in behind the feature pipeline.
pub trait Classifier {
    type Fitted: ProbabilisticClassifier;

    /// Fit on a scaled feature matrix and 0/1 labels.
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self::Fitted, ModelError>;
}

/// Trained binary classifier producing P(label = 1) per row.
pub trait ProbabilisticClassifier: Sized {
    /// Serializable form of the learned parameters.
    type Params: Serialize + DeserializeOwned;

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;
    fn n_features(&self) -> usize;
    fn extract_params(&self) -> Self::Params;
    fn from_params(params: Self::Params) -> Result<Self, ModelError>;
}
