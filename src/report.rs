//! Display table of booked reservations with their cancellation probability.

use crate::config::ReportConfig;
use crate::features::normalize::yes_no;
use crate::features::BinaryFeatures;
use crate::pipeline::AugmentedRow;
use chrono::NaiveDateTime;
use ndarray::Array1;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{rows} rows but {probabilities} probabilities")]
    LengthMismatch { rows: usize, probabilities: usize },

    #[error("invalid date format {0:?}")]
    InvalidFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One line of the booked table.
///
/// Dates and the price are empty when the underlying timestamps are missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookedRow {
    pub id: Option<i64>,
    pub user_id: i64,
    pub created_at: Option<String>,
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
    pub month: Option<String>,
    pub price: Option<i64>,
    pub insurance: &'static str,
    pub used_promo: &'static str,
    pub credit_card: &'static str,
    pub web_booking: &'static str,
    pub western_pickup: &'static str,
    pub modified_profile: &'static str,
    pub past_rides: u64,
    pub past_cancellations: u64,
    pub probability: f64,
}

/// Insurance category, `Corporate` taking precedence over `Personal` over
/// `Silvercar`.
pub fn insurance_category(binary: &BinaryFeatures) -> &'static str {
    let set = |flag: Option<f64>| flag == Some(1.0);
    if set(binary.insurance.corporate) {
        "Corporate"
    } else if set(binary.insurance.personal) {
        "Personal"
    } else if set(binary.insurance.silvercar) {
        "Silvercar"
    } else {
        "NA"
    }
}

fn format_datetime(value: Option<NaiveDateTime>, format: &str) -> Result<Option<String>, ReportError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let mut out = String::new();
    write!(out, "{}", value.format(format))
        .map_err(|_| ReportError::InvalidFormat(format.to_string()))?;
    Ok(Some(out))
}

/// Two decimals, halves to even.
pub fn round_probability(proba: f64) -> f64 {
    (proba * 100.0).round_ties_even() / 100.0
}

fn flag(value: Option<f64>) -> &'static str {
    yes_no(value.unwrap_or(0.0))
}

/// Build the booked table, sorted by pickup time. Rows without a pickup go last.
pub fn build_booked_report(
    rows: &[AugmentedRow],
    probabilities: &Array1<f64>,
    config: &ReportConfig,
) -> Result<Vec<BookedRow>, ReportError> {
    if rows.len() != probabilities.len() {
        return Err(ReportError::LengthMismatch {
            rows: rows.len(),
            probabilities: probabilities.len(),
        });
    }

    let mut keyed = rows
        .iter()
        .zip(probabilities.iter())
        .map(|(row, &proba)| -> Result<_, ReportError> {
            let ts = &row.timestamps;
            let binary = &row.features.binary;
            let historical = &row.features.historical;
            let price = row
                .features
                .dates
                .trip_duration
                .map(|days| (config.daily_rate * days) as i64);

            let booked = BookedRow {
                id: row.reservation.id,
                user_id: row.reservation.user_id,
                created_at: format_datetime(ts.created_at, &config.date_format)?,
                pickup: format_datetime(ts.pickup, &config.date_format)?,
                dropoff: format_datetime(ts.dropoff, &config.date_format)?,
                month: format_datetime(ts.pickup, &config.month_format)?,
                price,
                insurance: insurance_category(binary),
                used_promo: flag(binary.used_promo),
                credit_card: flag(binary.credit_card),
                web_booking: flag(binary.web_booking),
                western_pickup: flag(binary.western_pickup),
                modified_profile: flag(binary.modified_profile),
                past_rides: historical.past_rides as u64,
                past_cancellations: historical.past_cancellations as u64,
                probability: round_probability(proba),
            };
            Ok((ts.pickup, booked))
        })
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by_key(|(pickup, _)| (pickup.is_none(), *pickup));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Write the table as CSV with a header row.
pub fn write_report_csv<P: AsRef<Path>>(path: P, rows: &[BookedRow]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(rows = rows.len(), path = %path.as_ref().display(), "wrote booked report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReservationRow;
    use crate::features::{
        DateFeatures, HistoricalFeatures, InsuranceFlags, ReservationFeatures,
        ReservationTimestamps,
    };
    use ndarray::array;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn augmented(id: i64, pickup: Option<&str>, trip: Option<f64>) -> AugmentedRow {
        AugmentedRow {
            reservation: ReservationRow {
                id: Some(id),
                user_id: 10 + id,
                ..Default::default()
            },
            timestamps: ReservationTimestamps {
                created_at: Some(datetime("2018-01-02 08:00:00")),
                pickup: pickup.map(datetime),
                ..Default::default()
            },
            features: ReservationFeatures {
                historical: HistoricalFeatures {
                    past_rides: 3.0,
                    past_cancellations: 1.0,
                    past_percent_cancelled: 1.0 / 3.0,
                },
                dates: DateFeatures {
                    trip_duration: trip,
                    ..Default::default()
                },
                binary: BinaryFeatures {
                    used_promo: Some(1.0),
                    credit_card: Some(0.0),
                    insurance: InsuranceFlags {
                        corporate: Some(0.0),
                        silvercar: Some(1.0),
                        personal: Some(1.0),
                    },
                    ..Default::default()
                },
            },
        }
    }

    #[test]
    fn test_insurance_precedence() {
        let mut binary = BinaryFeatures::default();
        assert_eq!(insurance_category(&binary), "NA");
        binary.insurance.silvercar = Some(1.0);
        assert_eq!(insurance_category(&binary), "Silvercar");
        binary.insurance.personal = Some(1.0);
        assert_eq!(insurance_category(&binary), "Personal");
        binary.insurance.corporate = Some(1.0);
        assert_eq!(insurance_category(&binary), "Corporate");
    }

    #[test]
    fn test_build_report_formats_and_sorts() {
        let rows = vec![
            augmented(1, Some("2018-03-10 09:00:00"), Some(2.5)),
            augmented(2, None, None),
            augmented(3, Some("2018-02-01 12:00:00"), Some(1.0)),
        ];
        let report =
            build_booked_report(&rows, &array![0.123, 0.5, 0.987], &ReportConfig::default())
                .unwrap();

        let ids: Vec<_> = report.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);

        let first = &report[0];
        assert_eq!(first.pickup.as_deref(), Some("02-01-18"));
        assert_eq!(first.created_at.as_deref(), Some("01-02-18"));
        assert_eq!(first.month.as_deref(), Some("February, 2018"));
        assert_eq!(first.price, Some(89));
        assert_eq!(first.probability, 0.99);
        assert_eq!(first.insurance, "Personal");
        assert_eq!(first.used_promo, "Yes");
        assert_eq!(first.credit_card, "No");
        assert_eq!(first.past_rides, 3);

        // 89 * 2.5 = 222.5, truncated
        assert_eq!(report[1].price, Some(222));
        assert_eq!(report[1].probability, 0.12);

        assert_eq!(report[2].pickup, None);
        assert_eq!(report[2].price, None);
    }

    #[test]
    fn test_probability_halves_round_to_even() {
        assert_eq!(round_probability(0.125), 0.12);
        assert_eq!(round_probability(0.375), 0.38);
        assert_eq!(round_probability(0.987), 0.99);

        let rows = vec![augmented(1, Some("2018-03-10 09:00:00"), Some(1.0))];
        let report = build_booked_report(&rows, &array![0.125], &ReportConfig::default()).unwrap();
        assert_eq!(report[0].probability, 0.12);
    }

    #[test]
    fn test_build_report_length_mismatch() {
        let rows = vec![augmented(1, None, None)];
        let err = build_booked_report(&rows, &array![0.1, 0.2], &ReportConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::LengthMismatch {
                rows: 1,
                probabilities: 2
            }
        ));
    }

    #[test]
    fn test_write_report_csv() {
        let rows = vec![augmented(7, Some("2018-03-10 09:00:00"), Some(1.0))];
        let report = build_booked_report(&rows, &array![0.4], &ReportConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booked.csv");
        write_report_csv(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,user_id,created_at,pickup"));
        assert!(lines.next().unwrap().starts_with("7,17,01-02-18,03-10-18"));
    }
}
