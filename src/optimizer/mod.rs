use crate::model::ParamOps;

/// Trait for gradient-based optimizers.
///
/// Optimizers are responsible for updating model parameters based on computed
/// gradients. Training logic (`Trainer`) is decoupled from the update rule, so
/// any model can be paired with any optimizer without dynamic dispatch.
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use reservation_cancel::model::LogisticParams;
/// use reservation_cancel::optimizer::{Optimizer, SGD};
///
/// let params = LogisticParams { weights: array![1.0, 2.0], bias: 0.5 };
/// let gradients = LogisticParams { weights: array![0.1, -0.2], bias: -0.01 };
/// let updated = SGD::new(0.1).step(&params, &gradients);
/// assert!((updated.weights[0] - 0.99).abs() < 1e-12);
/// ```
pub trait Optimizer<P> {
    /// Performs an optimization step and returns the new parameters.
    ///
    /// Inputs are not mutated.
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// ```text
/// θ ← θ - η · ∇L(θ)
/// ```
/// where `η` is the learning rate and `∇L(θ)` is the loss gradient.
///
/// Stateless: no momentum, no adaptive rates.
#[derive(Clone, Debug)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }

    /// Returns the current learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.lr
    }
}

impl<P: ParamOps> Optimizer<P> for SGD {
    fn step(&self, params: &P, gradients: &P) -> P {
        params.add(&gradients.scale(-self.lr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogisticParams;
    use ndarray::array;

    #[test]
    fn test_sgd_new_initialization() {
        assert_eq!(SGD::new(0.01).learning_rate(), 0.01);
    }

    #[test]
    fn test_sgd_step() {
        let params = LogisticParams {
            weights: array![1.0, 2.0, 3.0],
            bias: 0.5,
        };
        let grads = LogisticParams {
            weights: array![0.1, -0.2, 0.0],
            bias: -1.0,
        };

        let updated = SGD::new(0.5).step(&params, &grads);

        for (w, e) in updated.weights.iter().zip([0.95, 2.1, 3.0]) {
            assert!((w - e).abs() < 1e-12);
        }
        assert!((updated.bias - 1.0).abs() < 1e-12);
        // inputs untouched
        assert_eq!(params.bias, 0.5);
    }

    #[test]
    fn test_sgd_zero_learning_rate_is_identity() {
        let params = LogisticParams {
            weights: array![1.0, -1.0],
            bias: 2.0,
        };
        let grads = LogisticParams {
            weights: array![5.0, 5.0],
            bias: 5.0,
        };
        assert_eq!(SGD::new(0.0).step(&params, &grads), params);
    }
}
