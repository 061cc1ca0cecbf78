use ndarray::Array1;

/// A differentiable loss used by [`crate::trainer::Trainer`].
///
/// The gradient w.r.t. the predictions is fed to
/// [`TrainableModel::backward`](crate::model::TrainableModel::backward).
pub trait Loss {
    type Prediction;
    type Target;

    /// Computes the scalar loss value, averaged over the batch.
    fn loss(&self, prediction: &Self::Prediction, target: &Self::Target) -> f64;

    /// Computes the gradient of the loss w.r.t. the prediction: ∂L/∂pred.
    fn grad_wrt_prediction(
        &self,
        prediction: &Self::Prediction,
        target: &Self::Target,
    ) -> Self::Prediction;
}

/// Logistic function, evaluated without overflow for large `|z|`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Binary Cross-Entropy loss with logits input (numerically stable).
///
/// Computes: `L = -(t * log(σ(z)) + (1-t) * log(1 - σ(z)))`
/// using the stable formulation: `max(z,0) - z*t + log(1 + exp(-|z|))`
///
/// Gradient w.r.t. logits: `∂L/∂z = (σ(z) - t) / n`
pub struct BCEWithLogitsLoss;

impl Loss for BCEWithLogitsLoss {
    type Prediction = Array1<f64>;
    type Target = Array1<f64>;

    fn loss(&self, logits: &Self::Prediction, targets: &Self::Target) -> f64 {
        if logits.is_empty() {
            return 0.0;
        }
        let total: f64 = logits
            .iter()
            .zip(targets.iter())
            .map(|(&z, &t)| z.max(0.0) - z * t + (-z.abs()).exp().ln_1p())
            .sum();
        total / logits.len() as f64
    }

    fn grad_wrt_prediction(
        &self,
        logits: &Self::Prediction,
        targets: &Self::Target,
    ) -> Self::Prediction {
        let n = logits.len().max(1) as f64;
        (logits.mapv(sigmoid) - targets) / n
    }
}
