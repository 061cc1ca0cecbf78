//! Binary booking and profile features.

use super::dates::ReservationTimestamps;
use super::{indicator, FeatureError};
use crate::config::FeatureConfig;
use crate::data::{IndividualReservation, ReservationRow, TimeZoneLookup};

/// One-hot insurance type. A reservation may carry none of the three.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InsuranceFlags {
    pub corporate: Option<f64>,
    pub silvercar: Option<f64>,
    pub personal: Option<f64>,
}

impl InsuranceFlags {
    pub fn from_row(row: &ReservationRow) -> Self {
        Self {
            corporate: row.insurance_corporate.map(indicator),
            silvercar: row.insurance_silvercar.map(indicator),
            personal: row.insurance_personal.map(indicator),
        }
    }

    /// Exact match of an interactive insurance category.
    pub fn from_category(category: &str) -> Self {
        Self {
            corporate: Some(indicator(category == "Corporate")),
            silvercar: Some(indicator(category == "Silvercar")),
            personal: Some(indicator(category == "Personal")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BinaryFeatures {
    pub used_promo: Option<f64>,
    pub credit_card: Option<f64>,
    pub web_booking: Option<f64>,
    pub western_pickup: Option<f64>,
    pub modified_profile: Option<f64>,
    pub insurance: InsuranceFlags,
}

/// Binary features of a bulk row.
///
/// A profile counts as modified when the calendar date of `updated_at` is
/// after the calendar date the user was created. Missing dates count as not
/// modified.
pub fn binary_features(
    row: &ReservationRow,
    timestamps: &ReservationTimestamps,
    config: &FeatureConfig,
) -> BinaryFeatures {
    let modified = match (timestamps.updated_at, timestamps.created_at_user) {
        (Some(updated), Some(created)) => updated.date() > created.date(),
        _ => false,
    };

    BinaryFeatures {
        used_promo: Some(indicator(row.promo_code_id.is_some())),
        credit_card: Some(indicator(row.postal_code.is_some())),
        web_booking: Some(indicator(
            row.booking_application.as_deref() == Some(config.web_channel.as_str()),
        )),
        western_pickup: Some(indicator(
            row.time_zone.as_deref() == Some(config.western_time_zone.as_str()),
        )),
        modified_profile: Some(indicator(modified)),
        insurance: InsuranceFlags::from_row(row),
    }
}

/// Binary features of an interactive record.
///
/// The pickup location's time zone comes from `lookup`; a failed lookup is an
/// error rather than a silent "not western".
pub fn individual_binary_features(
    input: &IndividualReservation,
    lookup: &dyn TimeZoneLookup,
    config: &FeatureConfig,
) -> Result<BinaryFeatures, FeatureError> {
    let time_zone = lookup.time_zone(input.location)?;

    Ok(BinaryFeatures {
        used_promo: Some(input.used_promo.normalize("used_promo")?),
        credit_card: Some(input.credit_card.normalize("credit_card")?),
        web_booking: Some(input.web_booking.normalize("web_booking")?),
        western_pickup: Some(indicator(time_zone == config.western_time_zone)),
        modified_profile: Some(input.modified_profile.normalize("modified_profile")?),
        insurance: InsuranceFlags::from_category(&input.insurance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LookupError, StaticTimeZones};
    use crate::features::FlagValue;
    use chrono::NaiveDateTime;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn individual() -> IndividualReservation {
        IndividualReservation {
            created_at: "2018-01-01 10:00".to_string(),
            pickup: "2018-01-03 10:00".to_string(),
            dropoff: "2018-01-05 10:00".to_string(),
            insurance: "Silvercar".to_string(),
            location: 1,
            past_finished: 2.0,
            past_cancellations: 0.0,
            used_promo: FlagValue::from("Yes"),
            credit_card: FlagValue::Bool(false),
            web_booking: FlagValue::Number(1.0),
            modified_profile: FlagValue::from("No"),
        }
    }

    #[test]
    fn test_bulk_binary_features() {
        let row = ReservationRow {
            promo_code_id: Some(12),
            postal_code: None,
            booking_application: Some("web".to_string()),
            time_zone: Some("pst".to_string()),
            insurance_corporate: Some(true),
            insurance_silvercar: Some(false),
            insurance_personal: None,
            ..Default::default()
        };
        let timestamps = ReservationTimestamps {
            updated_at: Some(datetime("2018-01-02 00:10:00")),
            created_at_user: Some(datetime("2018-01-01 23:50:00")),
            ..Default::default()
        };

        let features = binary_features(&row, &timestamps, &FeatureConfig::default());

        assert_eq!(features.used_promo, Some(1.0));
        assert_eq!(features.credit_card, Some(0.0));
        assert_eq!(features.web_booking, Some(1.0));
        assert_eq!(features.western_pickup, Some(1.0));
        assert_eq!(features.modified_profile, Some(1.0));
        assert_eq!(features.insurance.corporate, Some(1.0));
        assert_eq!(features.insurance.silvercar, Some(0.0));
        assert_eq!(features.insurance.personal, None);
    }

    #[test]
    fn test_same_day_update_is_not_a_modification() {
        let row = ReservationRow::default();
        let timestamps = ReservationTimestamps {
            updated_at: Some(datetime("2018-01-01 23:00:00")),
            created_at_user: Some(datetime("2018-01-01 01:00:00")),
            ..Default::default()
        };
        let features = binary_features(&row, &timestamps, &FeatureConfig::default());
        assert_eq!(features.modified_profile, Some(0.0));
        assert_eq!(features.web_booking, Some(0.0));
        assert_eq!(features.western_pickup, Some(0.0));
    }

    #[test]
    fn test_insurance_from_category_is_exact() {
        let flags = InsuranceFlags::from_category("Personal");
        assert_eq!(flags.personal, Some(1.0));
        assert_eq!(flags.corporate, Some(0.0));

        let none = InsuranceFlags::from_category("personal");
        assert_eq!(none.personal, Some(0.0));
    }

    #[test]
    fn test_individual_binary_features() {
        let zones = StaticTimeZones::new().with_zone(1, "pst");
        let features =
            individual_binary_features(&individual(), &zones, &FeatureConfig::default()).unwrap();

        assert_eq!(features.used_promo, Some(1.0));
        assert_eq!(features.credit_card, Some(0.0));
        assert_eq!(features.web_booking, Some(1.0));
        assert_eq!(features.western_pickup, Some(1.0));
        assert_eq!(features.modified_profile, Some(0.0));
        assert_eq!(features.insurance.silvercar, Some(1.0));
    }

    #[test]
    fn test_individual_lookup_failure() {
        let zones = StaticTimeZones::new();
        let err = individual_binary_features(&individual(), &zones, &FeatureConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FeatureError::Lookup(LookupError::UnknownLocation(1))
        ));
    }

    #[test]
    fn test_individual_invalid_flag() {
        let zones = StaticTimeZones::new().with_zone(1, "est");
        let mut input = individual();
        input.web_booking = FlagValue::from("sometimes");
        let err = individual_binary_features(&input, &zones, &FeatureConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::InvalidFlag {
                field: "web_booking",
                ..
            }
        ));
    }
}
