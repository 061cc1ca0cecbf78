//! Feature construction for reservation rows.
//!
//! Every derived attribute the classifier sees is built here:
//!
//! - [`history`]: per-user past rides, cancellations and cancellation rate,
//!   computed "as of" each row without looking at the row's own outcome.
//! - [`dates`]: numeric day offsets and interactive strings turned into
//!   timestamps, then lead time, trip length and calendar flags.
//! - [`binary`]: promo, credit card, web booking, western pickup, profile
//!   edits and insurance type as 0/1 values.
//! - [`normalize`]: the Yes/No/boolean mapping table for interactive flags.
//!
//! The pieces are combined into a [`ReservationFeatures`] value whose fields are
//! addressed by [`FeatureColumn`].

pub mod binary;
pub mod dates;
pub mod history;
pub mod normalize;

pub use binary::{BinaryFeatures, InsuranceFlags};
pub use dates::{DateFeatures, ReservationTimestamps};
pub use history::{HistoricalFeatures, HistorySnapshot, HistoryStore};
pub use normalize::FlagValue;

use crate::data::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error raised while deriving features from a row.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// An interactive date string could not be parsed.
    #[error("invalid date in `{column}`: {value:?}")]
    InvalidDate { column: &'static str, value: String },
    /// An interactive flag is outside the Yes/No mapping table.
    #[error("invalid value for flag `{field}`: {value}")]
    InvalidFlag { field: &'static str, value: String },
    /// The time zone of the pickup location could not be resolved.
    #[error("time zone lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

/// 1.0 for `true`, 0.0 for `false`.
pub(crate) fn indicator(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Which entry point a feature computation belongs to.
///
/// Only `Fit` appends to the user history, through
/// [`history::record_training_history`]; the transforms read it. The mode also
/// decides whether nonsensical date intervals are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineMode {
    /// Bulk training rows with known outcomes; history is recorded.
    Fit,
    /// Bulk rows scored against the history left by training.
    BatchTransform,
    /// One sparse interactive record.
    SingleTransform,
}

impl PipelineMode {
    /// Negative intervals are clamped to zero only for interactive input.
    pub fn clamps_intervals(self) -> bool {
        matches!(self, PipelineMode::SingleTransform)
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineMode::Fit => "fit",
            PipelineMode::BatchTransform => "batch_transform",
            PipelineMode::SingleTransform => "single_transform",
        };
        f.write_str(name)
    }
}

/// Name of a derived feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    PastRides,
    PastCancellations,
    PastPercentCancelled,
    DaysToPickup,
    TripDuration,
    PickupDow,
    MiddayPickup,
    WeekendPickup,
    WinterPickup,
    UsedPromo,
    CreditCard,
    WebBooking,
    WesternPickup,
    ModifiedProfile,
    InsuranceCorporate,
    InsuranceSilvercar,
    InsurancePersonal,
}

impl FeatureColumn {
    /// Default column order used to fit the scaler.
    pub const ALL: [FeatureColumn; 17] = [
        FeatureColumn::PastRides,
        FeatureColumn::PastCancellations,
        FeatureColumn::PastPercentCancelled,
        FeatureColumn::DaysToPickup,
        FeatureColumn::TripDuration,
        FeatureColumn::PickupDow,
        FeatureColumn::MiddayPickup,
        FeatureColumn::WeekendPickup,
        FeatureColumn::WinterPickup,
        FeatureColumn::UsedPromo,
        FeatureColumn::CreditCard,
        FeatureColumn::WebBooking,
        FeatureColumn::WesternPickup,
        FeatureColumn::ModifiedProfile,
        FeatureColumn::InsuranceCorporate,
        FeatureColumn::InsuranceSilvercar,
        FeatureColumn::InsurancePersonal,
    ];

    /// Column name as it appears in tables and configuration.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::PastRides => "past_rides",
            FeatureColumn::PastCancellations => "past_cancellations",
            FeatureColumn::PastPercentCancelled => "past_percent_cancelled",
            FeatureColumn::DaysToPickup => "days_to_pickup",
            FeatureColumn::TripDuration => "trip_duration",
            FeatureColumn::PickupDow => "pickup_dow",
            FeatureColumn::MiddayPickup => "midday_pickup",
            FeatureColumn::WeekendPickup => "weekend_pickup",
            FeatureColumn::WinterPickup => "winter_pickup",
            FeatureColumn::UsedPromo => "used_promo",
            FeatureColumn::CreditCard => "credit_card",
            FeatureColumn::WebBooking => "web_booking",
            FeatureColumn::WesternPickup => "western_pickup",
            FeatureColumn::ModifiedProfile => "modified_profile",
            FeatureColumn::InsuranceCorporate => "insurance_corporate",
            FeatureColumn::InsuranceSilvercar => "insurance_silvercar",
            FeatureColumn::InsurancePersonal => "insurance_personal",
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All derived features of one reservation.
///
/// `None` marks a value that could not be derived (a missing timestamp, a
/// null insurance flag); the bulk paths fill those with 0 before scaling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationFeatures {
    pub historical: HistoricalFeatures,
    pub dates: DateFeatures,
    pub binary: BinaryFeatures,
}

impl ReservationFeatures {
    pub fn new(historical: HistoricalFeatures, dates: DateFeatures, binary: BinaryFeatures) -> Self {
        Self {
            historical,
            dates,
            binary,
        }
    }

    /// Value of a single column.
    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::PastRides => Some(self.historical.past_rides),
            FeatureColumn::PastCancellations => Some(self.historical.past_cancellations),
            FeatureColumn::PastPercentCancelled => Some(self.historical.past_percent_cancelled),
            FeatureColumn::DaysToPickup => self.dates.days_to_pickup,
            FeatureColumn::TripDuration => self.dates.trip_duration,
            FeatureColumn::PickupDow => self.dates.pickup_dow,
            FeatureColumn::MiddayPickup => self.dates.midday_pickup,
            FeatureColumn::WeekendPickup => self.dates.weekend_pickup,
            FeatureColumn::WinterPickup => self.dates.winter_pickup,
            FeatureColumn::UsedPromo => self.binary.used_promo,
            FeatureColumn::CreditCard => self.binary.credit_card,
            FeatureColumn::WebBooking => self.binary.web_booking,
            FeatureColumn::WesternPickup => self.binary.western_pickup,
            FeatureColumn::ModifiedProfile => self.binary.modified_profile,
            FeatureColumn::InsuranceCorporate => self.binary.insurance.corporate,
            FeatureColumn::InsuranceSilvercar => self.binary.insurance.silvercar,
            FeatureColumn::InsurancePersonal => self.binary.insurance.personal,
        }
    }

    /// Values of `columns` in order, `NaN` where a value is missing.
    pub fn select(&self, columns: &[FeatureColumn]) -> Vec<f64> {
        columns
            .iter()
            .map(|&c| self.get(c).unwrap_or(f64::NAN))
            .collect()
    }
}
