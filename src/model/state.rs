/// Marker for a model or pipeline that has **not been trained yet**.
///
/// Used as a phantom parameter (e.g. `LogisticModel<Unfitted>`,
/// `CancellationModel<_, Unfitted>`):
/// - Training entry points (`Trainer::fit`, `CancellationModel::fit`) take an `Unfitted` value.
/// - Scoring methods are only implemented for the `Fitted` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unfitted;

/// Marker for a model or pipeline that has been **fully trained**.
///
/// A `Fitted` value carries only inference parameters: learned weights,
/// scaler statistics, and the user history snapshot. Optimizer state and
/// training hyperparameters are dropped at the transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fitted;
