use crate::model::logistic::{LogisticParams, LogisticRegressionModel};
use crate::model::TrainableModel;
use ndarray::Array1;

/// Penalty added to the loss, with its gradient w.r.t. the model parameters.
pub trait Regularizer<M: TrainableModel> {
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, M::Gradients);
}

/// Ridge penalty `λ‖w‖²`. The bias is not penalised.
#[derive(Clone, Debug)]
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }
}

impl Regularizer<LogisticRegressionModel> for L2 {
    fn regularizer_penalty_grad(&self, model: &LogisticRegressionModel) -> (f64, LogisticParams) {
        let weights = &model.params().weights;
        let penalty = self.lambda * weights.dot(weights);
        let grad = LogisticParams {
            weights: weights * (2.0 * self.lambda),
            bias: 0.0,
        };
        (penalty, grad)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoRegularizer;

impl Regularizer<LogisticRegressionModel> for NoRegularizer {
    fn regularizer_penalty_grad(&self, model: &LogisticRegressionModel) -> (f64, LogisticParams) {
        let n = model.params().weights.len();
        (
            0.0,
            LogisticParams {
                weights: Array1::zeros(n),
                bias: 0.0,
            },
        )
    }
}
