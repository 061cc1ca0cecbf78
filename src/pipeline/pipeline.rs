use super::PipelineError;
use crate::config::FeatureConfig;
use crate::data::{IndividualReservation, Outcome, ReservationRow, TimeZoneLookup};
use crate::features::binary::{binary_features, individual_binary_features};
use crate::features::dates::date_features;
use crate::features::history::{population_rate, record_training_history, snapshot_history};
use crate::features::{
    FeatureColumn, HistoricalFeatures, HistoryStore, PipelineMode, ReservationFeatures,
    ReservationTimestamps,
};
use crate::preprocessing::{
    ConstantImputer, ConstantImputerParams, FeatureTable, FittedConstantImputer,
    FittedStandardScaler, FittedTransformer, PreprocessingError, StandardScaler,
    StandardScalerParams, Transformer,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A reservation together with its converted timestamps and derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedRow {
    pub reservation: ReservationRow,
    pub timestamps: ReservationTimestamps,
    pub features: ReservationFeatures,
}

/// Result of a bulk transform: the augmented rows and the scaled matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub rows: Vec<AugmentedRow>,
    pub matrix: FeatureTable,
}

/// Unfitted pipeline: feature constants plus the transformers to fit.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: FeatureConfig,
    imputer: ConstantImputer,
    scaler: StandardScaler,
}

impl FeaturePipeline {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            imputer: ConstantImputer::default(),
            scaler: StandardScaler::new(),
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build training features and fit the imputer and scaler on them.
    ///
    /// Rows are visited in order. Each row's history features are read before
    /// its own label is recorded, so no row sees its own outcome. The
    /// population cancellation rate is computed once over all `labels`.
    ///
    /// # Errors
    /// - `rows` is empty
    /// - `labels` has a different length or contains a value other than 0/1
    /// - the imputer or scaler cannot be fit
    pub fn fit_transform(
        self,
        rows: &[ReservationRow],
        labels: &Array1<f64>,
    ) -> Result<(FittedFeaturePipeline, TransformOutput), PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }
        if rows.len() != labels.len() {
            return Err(PipelineError::LabelMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }

        let outcomes = labels
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                Outcome::from_label(value).ok_or(PipelineError::InvalidLabel { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rate = population_rate(&outcomes);
        let mut history = HistoryStore::new();
        let historical = record_training_history(&mut history, rows, &outcomes, rate);

        let augmented = augment(rows, historical, &self.config, PipelineMode::Fit);
        let table = feature_table(&augmented, &self.config.feature_columns);

        let (imputer, filled) = self.imputer.fit_transform(&table)?;
        let (scaler, matrix) = self.scaler.fit_transform(&filled)?;

        info!(
            rows = rows.len(),
            columns = matrix.n_columns(),
            users = history.user_count(),
            population_rate = rate,
            "fitted feature pipeline"
        );

        let fitted = FittedFeaturePipeline {
            config: self.config,
            history,
            population_rate: rate,
            imputer,
            scaler,
        };
        Ok((
            fitted,
            TransformOutput {
                rows: augmented,
                matrix,
            },
        ))
    }
}

/// Pipeline state after training: the frozen user history, the population
/// rate and the fitted imputer and scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedFeaturePipeline {
    config: FeatureConfig,
    history: HistoryStore,
    population_rate: f64,
    imputer: FittedConstantImputer,
    scaler: FittedStandardScaler,
}

/// Serializable form of a [`FittedFeaturePipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub config: FeatureConfig,
    pub history: HistoryStore,
    pub population_rate: f64,
    pub imputer: ConstantImputerParams,
    pub scaler: StandardScalerParams,
}

impl FittedFeaturePipeline {
    /// Features of rows to score, reading history as left by training.
    pub fn transform(&self, rows: &[ReservationRow]) -> Result<TransformOutput, PipelineError> {
        let historical = snapshot_history(&self.history, rows, self.population_rate);
        let augmented = augment(rows, historical, &self.config, PipelineMode::BatchTransform);
        let table = feature_table(&augmented, &self.config.feature_columns);
        let matrix = self.scale(&table)?;

        debug!(rows = rows.len(), mode = %PipelineMode::BatchTransform, "transformed rows");
        Ok(TransformOutput {
            rows: augmented,
            matrix,
        })
    }

    /// Scaled single-row matrix for an interactive record.
    ///
    /// History comes from the counts the user typed in, not from the store.
    /// Negative intervals are clamped to zero. The pickup location's time
    /// zone is resolved through `lookup`.
    pub fn transform_individual(
        &self,
        input: &IndividualReservation,
        lookup: &dyn TimeZoneLookup,
    ) -> Result<FeatureTable, PipelineError> {
        let mode = PipelineMode::SingleTransform;
        let timestamps = ReservationTimestamps::from_individual(input)?;
        let features = ReservationFeatures::new(
            HistoricalFeatures::from_counts(
                input.past_finished,
                input.past_cancellations,
                self.population_rate,
            ),
            date_features(&timestamps, &self.config, mode),
            individual_binary_features(input, lookup, &self.config)?,
        );

        let table = FeatureTable::from_features(&[features], &self.config.feature_columns);
        debug!(location = input.location, %mode, "transformed individual record");
        self.scale(&table)
    }

    fn scale(&self, table: &FeatureTable) -> Result<FeatureTable, PipelineError> {
        let filled = self.imputer.transform(table)?;
        Ok(self.scaler.transform(&filled)?)
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn population_rate(&self) -> f64 {
        self.population_rate
    }

    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    /// Ordered columns of every matrix this pipeline produces.
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.config.feature_columns
    }

    pub fn extract_params(&self) -> PipelineParams {
        PipelineParams {
            config: self.config.clone(),
            history: self.history.clone(),
            population_rate: self.population_rate,
            imputer: self.imputer.extract_params(),
            scaler: self.scaler.extract_params(),
        }
    }

    /// Rebuild a fitted pipeline, checking that the imputer and scaler were
    /// fit on exactly the configured columns.
    pub fn from_params(params: PipelineParams) -> Result<Self, PipelineError> {
        let expected = &params.config.feature_columns;
        for fitted in [&params.imputer.columns, &params.scaler.columns] {
            if fitted != expected {
                return Err(PreprocessingError::ColumnMismatch {
                    expected: fitted.clone(),
                    got: expected.clone(),
                }
                .into());
            }
        }

        Ok(Self {
            imputer: FittedConstantImputer::from_params(params.imputer)?,
            scaler: FittedStandardScaler::from_params(params.scaler)?,
            config: params.config,
            history: params.history,
            population_rate: params.population_rate,
        })
    }
}

fn augment(
    rows: &[ReservationRow],
    historical: Vec<HistoricalFeatures>,
    config: &FeatureConfig,
    mode: PipelineMode,
) -> Vec<AugmentedRow> {
    rows.iter()
        .zip(historical)
        .map(|(row, historical)| {
            let timestamps = ReservationTimestamps::from_offsets(row, config.epoch);
            let features = ReservationFeatures::new(
                historical,
                date_features(&timestamps, config, mode),
                binary_features(row, &timestamps, config),
            );
            AugmentedRow {
                reservation: row.clone(),
                timestamps,
                features,
            }
        })
        .collect()
}

fn feature_table(rows: &[AugmentedRow], columns: &[FeatureColumn]) -> FeatureTable {
    let features: Vec<ReservationFeatures> = rows.iter().map(|r| r.features.clone()).collect();
    FeatureTable::from_features(&features, columns)
}
