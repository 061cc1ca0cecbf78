//! Timestamp conversion and calendar features.
//!
//! Bulk rows carry timestamps as fractional day offsets from an epoch
//! (1899-12-30 by default); interactive records carry them as strings.
//! Both are converted to [`NaiveDateTime`] before any feature is derived.

use super::{indicator, FeatureError, PipelineMode};
use crate::config::FeatureConfig;
use crate::data::{IndividualReservation, ReservationRow};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// `epoch + days`, keeping the fractional part to the microsecond.
///
/// Returns `None` for non-finite offsets or results outside chrono's range.
pub fn offset_to_datetime(epoch: NaiveDate, days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let micros = (days * MICROS_PER_DAY).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    let start = epoch.and_hms_opt(0, 0, 0)?;
    start.checked_add_signed(Duration::microseconds(micros as i64))
}

/// Parse an interactive date or date-time string.
pub fn parse_datetime(column: &'static str, value: &str) -> Result<NaiveDateTime, FeatureError> {
    let trimmed = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| FeatureError::InvalidDate {
            column,
            value: value.to_string(),
        })
}

/// `later - earlier` in fractional days.
pub fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> Option<f64> {
    (later - earlier)
        .num_microseconds()
        .map(|us| us as f64 / MICROS_PER_DAY)
}

/// Converted timestamps of one reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReservationTimestamps {
    pub created_at: Option<NaiveDateTime>,
    pub pickup: Option<NaiveDateTime>,
    pub dropoff: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub created_at_user: Option<NaiveDateTime>,
}

impl ReservationTimestamps {
    pub fn from_offsets(row: &ReservationRow, epoch: NaiveDate) -> Self {
        let convert = |offset: Option<f64>| offset.and_then(|days| offset_to_datetime(epoch, days));
        Self {
            created_at: convert(row.created_at),
            pickup: convert(row.pickup),
            dropoff: convert(row.dropoff),
            updated_at: convert(row.updated_at),
            created_at_user: convert(row.created_at_user),
        }
    }

    /// Interactive records only carry creation, pickup and dropoff.
    pub fn from_individual(input: &IndividualReservation) -> Result<Self, FeatureError> {
        Ok(Self {
            created_at: Some(parse_datetime("created_at", &input.created_at)?),
            pickup: Some(parse_datetime("pickup", &input.pickup)?),
            dropoff: Some(parse_datetime("dropoff", &input.dropoff)?),
            updated_at: None,
            created_at_user: None,
        })
    }
}

/// Lead time, trip length and pickup calendar flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateFeatures {
    pub days_to_pickup: Option<f64>,
    pub trip_duration: Option<f64>,
    /// Monday = 0 … Sunday = 6.
    pub pickup_dow: Option<f64>,
    pub midday_pickup: Option<f64>,
    pub weekend_pickup: Option<f64>,
    pub winter_pickup: Option<f64>,
}

fn interval(
    later: Option<NaiveDateTime>,
    earlier: Option<NaiveDateTime>,
    clamp: bool,
) -> Option<f64> {
    let days = days_between(later?, earlier?)?;
    if clamp && days < 0.0 {
        Some(0.0)
    } else {
        Some(days)
    }
}

pub fn date_features(
    timestamps: &ReservationTimestamps,
    config: &FeatureConfig,
    mode: PipelineMode,
) -> DateFeatures {
    let clamp = mode.clamps_intervals();
    let days_to_pickup = interval(timestamps.pickup, timestamps.created_at, clamp);
    let trip_duration = interval(timestamps.dropoff, timestamps.pickup, clamp);

    let Some(pickup) = timestamps.pickup else {
        return DateFeatures {
            days_to_pickup,
            trip_duration,
            ..DateFeatures::default()
        };
    };

    let dow = pickup.weekday().num_days_from_monday();
    DateFeatures {
        days_to_pickup,
        trip_duration,
        pickup_dow: Some(dow as f64),
        midday_pickup: Some(indicator(config.is_midday(pickup.hour()))),
        weekend_pickup: Some(indicator(config.weekend_days.contains(&dow))),
        winter_pickup: Some(indicator(config.winter_months.contains(&pickup.month()))),
    }
}
