//! Configuration for the cancellation model.
//!
//! Every constant the feature formulas depend on lives here: the epoch used to
//! decode numeric dates, the midday window, the weekend and winter sets, the
//! western time zone, and the ordered list of feature columns the scaler is
//! fitted on. Values are read from a TOML file layered over [`AppConfig::default`].

use crate::features::FeatureColumn;
use chrono::NaiveDate;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error raised while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be merged or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub features: FeatureConfig,
    pub model: ModelConfig,
    pub report: ReportConfig,
    pub data: DataConfig,
}

/// Constants used by the feature builder.
///
/// A copy of this struct is persisted with every fitted pipeline, so inference
/// always runs with the constants the scaler was fitted under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    /// Day zero of the numeric date encoding used by the bulk rows.
    pub epoch: NaiveDate,
    /// First hour (inclusive) of the midday pickup window.
    pub midday_start_hour: u32,
    /// Last hour (inclusive) of the midday pickup window.
    pub midday_end_hour: u32,
    /// Pickup weekdays counted as weekend, Monday = 0.
    pub weekend_days: Vec<u32>,
    /// Pickup months counted as winter, January = 1.
    pub winter_months: Vec<u32>,
    /// Time zone label marking a western pickup location.
    pub western_time_zone: String,
    /// Booking channel label marking a web booking.
    pub web_channel: String,
    /// Ordered columns selected for scaling and classification.
    pub feature_columns: Vec<FeatureColumn>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default(),
            midday_start_hour: 7,
            midday_end_hour: 12,
            weekend_days: vec![4, 5, 6],
            winter_months: vec![1, 12],
            western_time_zone: "pst".to_string(),
            web_channel: "web".to_string(),
            feature_columns: FeatureColumn::ALL.to_vec(),
        }
    }
}

impl FeatureConfig {
    /// Whether `hour` falls inside the midday pickup window.
    pub fn is_midday(&self, hour: u32) -> bool {
        (self.midday_start_hour..=self.midday_end_hour).contains(&hour)
    }
}

/// Classifier and decision settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Probability above which a reservation is flagged as a likely cancellation.
    pub threshold: f64,
    /// SGD learning rate for the logistic regression.
    pub learning_rate: f64,
    /// Number of passes over the training matrix.
    pub max_epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// L2 penalty strength, 0 disables regularization.
    pub l2: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            learning_rate: 0.1,
            max_epochs: 500,
            batch_size: 64,
            l2: 0.0,
        }
    }
}

/// Settings for the booked-reservations display table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Flat daily rental rate used to estimate the reservation price.
    pub daily_rate: f64,
    /// `strftime` format for the created/pickup/dropoff columns.
    pub date_format: String,
    /// `strftime` format for the pickup month column.
    pub month_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            daily_rate: 89.0,
            date_format: "%m-%d-%y".to_string(),
            month_format: "%B, %Y".to_string(),
        }
    }
}

/// Locations of the raw tables and of the persisted model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    /// Finished, started and cancelled reservations used for training.
    pub past_reservations: PathBuf,
    /// Upcoming reservations to score.
    pub booked_reservations: PathBuf,
    /// User profiles joined onto reservations by `user_id`.
    pub users: PathBuf,
    /// `location,time_zone` table backing the interactive lookup.
    pub time_zones: PathBuf,
    /// Where the trained model artifact is written.
    pub model_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            past_reservations: PathBuf::from("data/past_reservations.csv"),
            booked_reservations: PathBuf::from("data/booked_reservations.csv"),
            users: PathBuf::from("data/users.csv"),
            time_zones: PathBuf::from("data/time_zones.csv"),
            model_path: PathBuf::from("model.bin"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            model: ModelConfig::default(),
            report: ReportConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/config.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, falling back to defaults for
    /// any key the file leaves out.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.features.epoch,
            NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
        );
        assert_eq!(config.features.weekend_days, vec![4, 5, 6]);
        assert_eq!(config.features.winter_months, vec![1, 12]);
        assert_eq!(config.features.feature_columns.len(), FeatureColumn::ALL.len());
        assert_eq!(config.model.threshold, 0.5);
    }

    #[test]
    fn test_midday_window_is_inclusive() {
        let features = FeatureConfig::default();
        assert!(!features.is_midday(6));
        assert!(features.is_midday(7));
        assert!(features.is_midday(12));
        assert!(!features.is_midday(13));
    }

    #[test]
    fn test_load_from_path_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[model]\nthreshold = 0.35\n\n[features]\nwestern_time_zone = \"pdt\"\nfeature_columns = [\"past_rides\", \"trip_duration\"]"
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();

        assert_eq!(config.model.threshold, 0.35);
        assert_eq!(config.model.max_epochs, 500);
        assert_eq!(config.features.western_time_zone, "pdt");
        assert_eq!(
            config.features.feature_columns,
            vec![FeatureColumn::PastRides, FeatureColumn::TripDuration]
        );
        assert_eq!(config.features.epoch, FeatureConfig::default().epoch);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load_from_path("does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
