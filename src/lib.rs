//! # reservation-cancel
//!
//! Cancellation-probability model for car-rental reservations, built around a
//! feature pipeline that accumulates per-user history without leaking a row's
//! own outcome into its features.
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: Models and pipelines carry their training state in
//!   the type system (`Unfitted` vs `Fitted`). Scoring exists only on fitted
//!   values, and fitting consumes the unfitted one.
//! - **Leak-free History**: During training each row reads its user's history
//!   before its own outcome is appended. Inference reads the history frozen at
//!   the end of training.
//! - **One Scaler, Three Entry Points**: Bulk training, bulk scoring and single
//!   interactive records all produce the same ordered columns, scaled by the
//!   scaler fit at training time.
//! - **Training/Inference Separation**: Fitted models hold only prediction
//!   parameters; losses, optimizers and the trainer live in their own modules.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reservation_cancel::config::AppConfig;
//! use reservation_cancel::data::{split_labels, CsvSource, ReservationSource};
//! use reservation_cancel::model::{CancellationModel, LogisticRegression};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let source = CsvSource::from_config(&config.data);
//!
//! let rows = source.load_rows(false)?;
//! let labels = split_labels(&rows);
//!
//! let classifier = LogisticRegression::from_config(&config.model);
//! let model = CancellationModel::new(classifier, &config).fit(&rows, &labels)?;
//!
//! let booked = source.load_rows(true)?;
//! let probabilities = model.predict_proba(&booked)?;
//! model.save_to_file(&config.data.model_path)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `config`: Feature constants, classifier settings and data paths
//! - `data`: Raw records, the user join, labels, CSV source, time zone lookup
//! - `features`: Historical, date and binary feature construction
//! - `preprocessing`: Feature tables, zero imputation and standard scaling
//! - `pipeline`: Orchestration of feature construction per entry point
//! - `model`: Logistic regression and the end-to-end cancellation model
//! - `loss`, `optimizer`, `regularizers`, `trainer`, `dataset`: Training loop pieces
//! - `report`: Display table of booked reservations
//! - `serialization`: Byte encoding of fitted parameters

/// Configuration loaded from TOML with defaults.
pub mod config;

/// Raw reservation data access.
pub mod data;

/// Data loading utilities and dataset abstractions.
pub mod dataset;

/// Derived reservation features.
pub mod features;

/// Differentiable loss functions for model training.
pub mod loss;

/// Machine learning models with compile-time state safety.
pub mod model;

/// Optimization algorithms for parameter updates.
pub mod optimizer;

/// Feature pipeline for training, batch scoring and single records.
pub mod pipeline;

/// Data preprocessing transformers.
pub mod preprocessing;

/// Weight regularization strategies.
pub mod regularizers;

/// Booked-reservations report.
pub mod report;

/// Model persistence utilities.
pub mod serialization;

/// High-level training loop orchestration.
pub mod trainer;

pub use config::AppConfig;
pub use data::{IndividualReservation, Outcome, ReservationRow};
pub use features::{FeatureColumn, PipelineMode};
pub use model::{CancellationModel, Fitted, LogisticRegression, ModelError, Unfitted};
pub use pipeline::{FeaturePipeline, FittedFeaturePipeline, PipelineError};
