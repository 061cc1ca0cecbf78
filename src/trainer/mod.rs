use crate::{
    dataset::Dataset,
    loss::Loss,
    model::{ParamOps, TrainableModel},
    optimizer::Optimizer,
    regularizers::Regularizer,
};
use ndarray::{Array1, Array2};
use thiserror::Error;
use tracing::{debug, info};

/// Error raised by the training loop.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("dataset length unknown")]
    UnknownLength,
    #[error("failed to load batch: {0}")]
    Data(String),
    /// The averaged loss became NaN or infinite.
    #[error("training diverged at epoch {epoch}")]
    Diverged { epoch: usize },
}

/// Orchestrates the training loop for a `TrainableModel`.
///
/// Combines a loss function, optimizer, and regularizer to fit a model on a dataset.
/// Once built via `TrainerBuilder`, it is immutable and can be reused across
/// multiple models of the same type.
///
/// `fit` returns the model's fitted form (via `into_fitted`), which contains
/// only inference parameters.
pub struct Trainer<L, O, R> {
    pub(crate) batch_size: usize,
    pub(crate) max_epochs: usize,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    pub(crate) regularizer: R,
}

/// Fluent builder for constructing a `Trainer` with custom hyperparameters.
///
/// Defaults:
/// - `batch_size`: 32
/// - `max_epochs`: 1000
pub struct TrainerBuilder<L, O, R> {
    batch_size: usize,
    max_epochs: usize,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
}

impl<L, O, R> TrainerBuilder<L, O, R> {
    /// Creates a new `TrainerBuilder` with the given components.
    ///
    /// # Arguments
    /// * `loss_fn`: differentiable loss (e.g., `BCEWithLogitsLoss`)
    /// * `optimizer`: parameter updater (e.g., `SGD`)
    /// * `regularizer`: penalty term (`L2` or `NoRegularizer`)
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            batch_size: 32,
            max_epochs: 1000,
            loss_fn,
            optimizer,
            regularizer,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn build(self) -> Trainer<L, O, R> {
        Trainer {
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            regularizer: self.regularizer,
        }
    }
}

impl<L, O, R> Trainer<L, O, R> {
    /// Convenience constructor that starts the builder pattern.
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<L, O, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }

    /// Trains the model on the provided dataset for `max_epochs` passes.
    ///
    /// Batches are visited in dataset order. Gradients are averaged per batch
    /// before the regularizer gradient is added. The logged loss is the
    /// sample-weighted mean over the epoch.
    ///
    /// # Errors
    /// - The dataset is empty or its length is unknown
    /// - A batch fails to load
    /// - The loss becomes non-finite
    pub fn fit<M, P, D>(&self, mut model: M, dataset: &D) -> Result<M::Output, TrainingError>
    where
        L: Loss<Prediction = Array1<f64>, Target = Array1<f64>>,
        M: TrainableModel<Input = Array2<f64>, Prediction = Array1<f64>, Params = P, Gradients = P>,
        O: Optimizer<P>,
        R: Regularizer<M>,
        P: ParamOps,
        D: Dataset,
    {
        let n_total = dataset.len().ok_or(TrainingError::UnknownLength)?;
        if n_total == 0 {
            return Err(TrainingError::EmptyDataset);
        }

        let mut last_loss = f64::NAN;
        for epoch in 0..self.max_epochs {
            let mut total_loss = 0.0;
            for batch_result in dataset.batches(self.batch_size) {
                let (batch_x, batch_y) =
                    batch_result.map_err(|e| TrainingError::Data(e.to_string()))?;

                let preds = model.forward(&batch_x);
                let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
                let batch_loss = self.loss_fn.loss(&preds, &batch_y) + reg_penalty;
                total_loss += batch_loss * batch_y.len() as f64;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds);
                let total_grads = grads.add(&reg_grad);
                let new_params = self.optimizer.step(model.params(), &total_grads);
                model.update_params(&new_params);
            }

            let avg_loss = total_loss / n_total as f64;
            if !avg_loss.is_finite() {
                return Err(TrainingError::Diverged { epoch });
            }
            debug!(epoch, loss = avg_loss, "epoch finished");
            last_loss = avg_loss;
        }

        info!(
            epochs = self.max_epochs,
            samples = n_total,
            loss = last_loss,
            "training finished"
        );
        Ok(model.into_fitted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::InMemoryDataset,
        loss::BCEWithLogitsLoss,
        model::logistic::{LogisticParams, LogisticRegressionModel},
        model::ProbabilisticClassifier,
        optimizer::SGD,
        regularizers::{NoRegularizer, L2},
    };
    use ndarray::array;

    fn separable() -> InMemoryDataset {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.5], [1.0], [1.5], [2.0]];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        InMemoryDataset::new(x, y).unwrap()
    }

    // === TrainerBuilder Tests ===

    #[test]
    fn test_trainer_builder_default_values() {
        let builder = TrainerBuilder::new(BCEWithLogitsLoss, SGD::new(0.01), NoRegularizer);

        assert_eq!(builder.batch_size, 32);
        assert_eq!(builder.max_epochs, 1000);
    }

    #[test]
    fn test_trainer_builder_custom_values() {
        let trainer = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.01), NoRegularizer)
            .batch_size(64)
            .max_epochs(500)
            .build();

        assert_eq!(trainer.batch_size, 64);
        assert_eq!(trainer.max_epochs, 500);
    }

    // === Training Tests ===

    #[test]
    fn test_fit_separates_classes() {
        let trainer = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.5), NoRegularizer)
            .batch_size(4)
            .max_epochs(300)
            .build();

        let fitted = trainer
            .fit(LogisticRegressionModel::new(1), &separable())
            .unwrap();

        let proba = fitted.predict_proba(&array![[-2.0], [2.0]]).unwrap();
        assert!(proba[0] < 0.2, "p(-2) = {}", proba[0]);
        assert!(proba[1] > 0.8, "p(2) = {}", proba[1]);
    }

    #[test]
    fn test_l2_shrinks_weights() {
        let plain = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.5), NoRegularizer)
            .max_epochs(200)
            .build()
            .fit(LogisticRegressionModel::new(1), &separable())
            .unwrap();
        let ridge = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.5), L2::new(0.1))
            .max_epochs(200)
            .build()
            .fit(LogisticRegressionModel::new(1), &separable())
            .unwrap();

        assert!(ridge.params().weights[0].abs() < plain.params().weights[0].abs());
    }

    #[test]
    fn test_zero_epochs_returns_initial_params() {
        let initial = LogisticParams {
            weights: array![0.25],
            bias: -0.5,
        };
        let fitted = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.1), NoRegularizer)
            .max_epochs(0)
            .build()
            .fit(LogisticRegressionModel::from_params(initial.clone()), &separable())
            .unwrap();

        assert_eq!(fitted.params(), &initial);
    }

    #[test]
    fn test_divergence_is_reported() {
        let x = array![[1e300], [-1e300]];
        let y = array![1.0, 0.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();

        let result = Trainer::builder(BCEWithLogitsLoss, SGD::new(1e300), NoRegularizer)
            .max_epochs(5)
            .build()
            .fit(LogisticRegressionModel::new(1), &dataset);

        assert!(matches!(result, Err(TrainingError::Diverged { .. })));
    }
}
