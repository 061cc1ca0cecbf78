//! End-to-end cancellation model.
//!
//! [`CancellationModel`] owns the feature pipeline and a classifier. Fitting
//! consumes the unfitted model and returns a fitted one, so a trained model
//! can never be refit in place; [`CancellationModel::reset`] is the explicit
//! way back to a fresh, untrained state.

use crate::config::AppConfig;
use crate::data::{IndividualReservation, ReservationRow, TimeZoneLookup};
use crate::model::{Classifier, Fitted, ModelError, ProbabilisticClassifier, Unfitted};
use crate::pipeline::{AugmentedRow, FeaturePipeline, FittedFeaturePipeline, PipelineParams};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::Path;
use tracing::info;

/// Maps a training state to the pipeline type held in that state.
pub trait PipelineState {
    type Pipeline;
}

impl PipelineState for Unfitted {
    type Pipeline = FeaturePipeline;
}

impl PipelineState for Fitted {
    type Pipeline = FittedFeaturePipeline;
}

/// 1 when `proba` is strictly above `threshold`.
pub fn classify(proba: f64, threshold: f64) -> u8 {
    u8::from(proba > threshold)
}

/// Everything a fitted model needs, written as one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact<P> {
    pub threshold: f64,
    pub pipeline: PipelineParams,
    pub classifier: P,
}

pub struct CancellationModel<C, S: PipelineState> {
    classifier: C,
    pipeline: S::Pipeline,
    threshold: f64,
    _state: PhantomData<S>,
}

impl<C: Classifier> CancellationModel<C, Unfitted> {
    /// Untrained model with the feature constants and threshold of `config`.
    pub fn new(classifier: C, config: &AppConfig) -> Self {
        Self {
            classifier,
            pipeline: FeaturePipeline::new(config.features.clone()),
            threshold: config.model.threshold,
            _state: PhantomData,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Build training features in row order, fit the scaler, then fit the
    /// classifier on the scaled matrix.
    pub fn fit(
        self,
        rows: &[ReservationRow],
        labels: &Array1<f64>,
    ) -> Result<CancellationModel<C::Fitted, Fitted>, ModelError> {
        let (pipeline, output) = self.pipeline.fit_transform(rows, labels)?;
        let classifier = self.classifier.fit(output.matrix.values(), labels)?;

        info!(
            rows = rows.len(),
            features = classifier.n_features(),
            threshold = self.threshold,
            "fitted cancellation model"
        );

        Ok(CancellationModel {
            classifier,
            pipeline,
            threshold: self.threshold,
            _state: PhantomData,
        })
    }
}

impl<F: ProbabilisticClassifier> CancellationModel<F, Fitted> {
    /// Assemble a fitted model from already fitted parts.
    pub fn from_parts(
        classifier: F,
        pipeline: FittedFeaturePipeline,
        threshold: f64,
    ) -> Result<Self, ModelError> {
        let expected = pipeline.columns().len();
        if classifier.n_features() != expected {
            return Err(ModelError::FeatureMismatch {
                expected,
                got: classifier.n_features(),
            });
        }
        Ok(Self {
            classifier,
            pipeline,
            threshold,
            _state: PhantomData,
        })
    }

    pub fn predict_proba(&self, rows: &[ReservationRow]) -> Result<Array1<f64>, ModelError> {
        let output = self.pipeline.transform(rows)?;
        self.classifier.predict_proba(output.matrix.values())
    }

    /// Augmented rows and their probabilities, for building the booked report.
    pub fn transform_and_predict(
        &self,
        rows: &[ReservationRow],
    ) -> Result<(Vec<AugmentedRow>, Array1<f64>), ModelError> {
        let output = self.pipeline.transform(rows)?;
        let proba = self.classifier.predict_proba(output.matrix.values())?;
        Ok((output.rows, proba))
    }

    /// 0/1 decisions; a probability equal to the threshold maps to 0.
    pub fn predict(&self, rows: &[ReservationRow]) -> Result<Array1<u8>, ModelError> {
        let threshold = self.threshold;
        Ok(self.predict_proba(rows)?.mapv(|p| classify(p, threshold)))
    }

    pub fn predict_individual_proba(
        &self,
        input: &IndividualReservation,
        lookup: &dyn TimeZoneLookup,
    ) -> Result<f64, ModelError> {
        let table = self.pipeline.transform_individual(input, lookup)?;
        let proba = self.classifier.predict_proba(table.values())?;
        proba.get(0).copied().ok_or(ModelError::EmptyInput)
    }

    pub fn predict_individual(
        &self,
        input: &IndividualReservation,
        lookup: &dyn TimeZoneLookup,
    ) -> Result<u8, ModelError> {
        let proba = self.predict_individual_proba(input, lookup)?;
        Ok(classify(proba, self.threshold))
    }

    /// Fraction of rows whose decision matches the label.
    pub fn score(&self, rows: &[ReservationRow], labels: &Array1<f64>) -> Result<f64, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        if rows.len() != labels.len() {
            return Err(ModelError::LabelMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }

        let predictions = self.predict(rows)?;
        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|&(&p, &y)| f64::from(p) == y)
            .count();
        Ok(correct as f64 / rows.len() as f64)
    }

    /// Drop the fitted state: a fresh pipeline (empty history, unfitted
    /// scaler) under the same feature constants, with a new classifier.
    pub fn reset<C: Classifier>(self, classifier: C) -> CancellationModel<C, Unfitted> {
        CancellationModel {
            classifier,
            pipeline: FeaturePipeline::new(self.pipeline.config().clone()),
            threshold: self.threshold,
            _state: PhantomData,
        }
    }

    pub fn pipeline(&self) -> &FittedFeaturePipeline {
        &self.pipeline
    }

    pub fn classifier(&self) -> &F {
        &self.classifier
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn to_artifact(&self) -> ModelArtifact<F::Params> {
        ModelArtifact {
            threshold: self.threshold,
            pipeline: self.pipeline.extract_params(),
            classifier: self.classifier.extract_params(),
        }
    }

    pub fn from_artifact(artifact: ModelArtifact<F::Params>) -> Result<Self, ModelError> {
        let pipeline = FittedFeaturePipeline::from_params(artifact.pipeline)?;
        let classifier = F::from_params(artifact.classifier)?;
        Self::from_parts(classifier, pipeline, artifact.threshold)
    }

    /// Write pipeline and classifier together as one bincode file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let bytes = bincode::serialize(&self.to_artifact())?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(path = %path.as_ref().display(), "saved model");
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path.as_ref())?;
        let artifact: ModelArtifact<F::Params> = bincode::deserialize(&bytes)?;
        let model = Self::from_artifact(artifact)?;
        info!(path = %path.as_ref().display(), "loaded model");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{split_labels, StaticTimeZones};
    use crate::features::FlagValue;
    use crate::model::logistic::{FittedLogisticRegression, LogisticRegression};
    use crate::pipeline::PipelineError;
    use crate::preprocessing::FittedTransformer;

    fn row(user_id: i64, pickup: f64, lead: f64, state: &str) -> ReservationRow {
        ReservationRow {
            user_id,
            created_at: Some(pickup - lead),
            pickup: Some(pickup),
            dropoff: Some(pickup + 3.0),
            current_state: Some(state.to_string()),
            ..Default::default()
        }
    }

    // Short lead times finish, long ones cancel.
    fn training_rows() -> Vec<ReservationRow> {
        (0..40)
            .map(|i| {
                let cancelled = i % 2 == 0;
                let lead = if cancelled { 60.0 } else { 2.0 };
                let state = if cancelled { "cancelled" } else { "finished" };
                row(i % 7, 43100.0 + i as f64, lead, state)
            })
            .collect()
    }

    fn fitted() -> CancellationModel<FittedLogisticRegression, Fitted> {
        let rows = training_rows();
        let labels = split_labels(&rows);
        let classifier = LogisticRegression::new().learning_rate(0.5).max_epochs(200);
        CancellationModel::new(classifier, &AppConfig::default())
            .fit(&rows, &labels)
            .unwrap()
    }

    #[test]
    fn test_classify_is_strict() {
        assert_eq!(classify(0.5, 0.5), 0);
        assert_eq!(classify(0.5 + 1e-9, 0.5), 1);
        assert_eq!(classify(0.1, 0.5), 0);
    }

    #[test]
    fn test_fit_and_score() {
        let model = fitted();
        let rows = training_rows();
        let labels = split_labels(&rows);

        let proba = model.predict_proba(&rows).unwrap();
        assert_eq!(proba.len(), rows.len());
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));

        let accuracy = model.score(&rows, &labels).unwrap();
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn test_predict_matches_threshold() {
        let model = fitted();
        let rows = training_rows();
        let proba = model.predict_proba(&rows).unwrap();
        let decisions = model.predict(&rows).unwrap();
        for (p, d) in proba.iter().zip(decisions.iter()) {
            assert_eq!(*d, classify(*p, model.threshold()));
        }
    }

    #[test]
    fn test_score_rejects_empty_and_mismatched() {
        let model = fitted();
        assert!(matches!(
            model.score(&[], &Array1::zeros(0)),
            Err(ModelError::EmptyInput)
        ));
        assert!(matches!(
            model.score(&training_rows(), &Array1::zeros(3)),
            Err(ModelError::LabelMismatch { rows: 40, labels: 3 })
        ));
    }

    #[test]
    fn test_fit_propagates_pipeline_errors() {
        let model = CancellationModel::new(LogisticRegression::new(), &AppConfig::default());
        let err = model.fit(&[], &Array1::zeros(0)).err().unwrap();
        assert!(matches!(
            err,
            ModelError::Pipeline(PipelineError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_predict_individual() {
        let model = fitted();
        let lookup = StaticTimeZones::new().with_zone(3, "est");
        let input = IndividualReservation {
            created_at: "2018-01-01".to_string(),
            pickup: "2018-03-02 09:00".to_string(),
            dropoff: "2018-03-05 09:00".to_string(),
            insurance: String::new(),
            location: 3,
            past_finished: 0.0,
            past_cancellations: 0.0,
            used_promo: FlagValue::from("No"),
            credit_card: FlagValue::from("No"),
            web_booking: FlagValue::from("No"),
            modified_profile: FlagValue::from("No"),
        };

        let proba = model.predict_individual_proba(&input, &lookup).unwrap();
        assert!((0.0..=1.0).contains(&proba));
        assert_eq!(
            model.predict_individual(&input, &lookup).unwrap(),
            classify(proba, model.threshold())
        );
    }

    #[test]
    fn test_reset_starts_from_empty_history() {
        let model = fitted();
        let threshold = model.threshold();
        let fresh = model.reset(LogisticRegression::new().max_epochs(5));
        assert_eq!(fresh.threshold, threshold);
        assert_eq!(fresh.pipeline.config(), &AppConfig::default().features);

        let rows = training_rows();
        let refit = fresh.fit(&rows, &split_labels(&rows)).unwrap();
        assert_eq!(refit.pipeline().history().total_outcomes(), rows.len());
    }

    #[test]
    fn test_save_load() -> Result<(), Box<dyn std::error::Error>> {
        let model = fitted();
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("model.bin");

        model.save_to_file(&path)?;
        let loaded = CancellationModel::<FittedLogisticRegression, Fitted>::load_from_file(&path)?;

        let rows = training_rows();
        assert_eq!(loaded.predict_proba(&rows)?, model.predict_proba(&rows)?);
        assert_eq!(loaded.threshold(), model.threshold());
        assert_eq!(loaded.pipeline(), model.pipeline());
        Ok(())
    }

    #[test]
    fn test_artifact_keeps_scaler_with_history() {
        let model = fitted();
        let artifact = model.to_artifact();

        assert_eq!(artifact.pipeline.scaler, model.pipeline().scaler().extract_params());
        assert_eq!(artifact.pipeline.history.total_outcomes(), training_rows().len());
        assert_eq!(artifact.pipeline.population_rate, 0.5);

        let bytes = bincode::serialize(&artifact).unwrap();
        let restored: ModelArtifact<crate::model::LogisticParams> =
            bincode::deserialize(&bytes).unwrap();
        let loaded = CancellationModel::<FittedLogisticRegression, Fitted>::from_artifact(restored)
            .unwrap();
        assert_eq!(loaded.pipeline().history(), model.pipeline().history());
        assert_eq!(loaded.pipeline().scaler(), model.pipeline().scaler());
    }

    #[test]
    fn test_from_parts_checks_width() {
        let model = fitted();
        let narrow = FittedLogisticRegression::new(crate::model::LogisticParams {
            weights: Array1::zeros(2),
            bias: 0.0,
        });
        let err = CancellationModel::from_parts(narrow, model.pipeline().clone(), 0.5)
            .err()
            .unwrap();
        assert!(matches!(err, ModelError::FeatureMismatch { got: 2, .. }));
    }
}
