//! Sources of raw reservation tables.

use super::error::DataError;
use super::records::{join_users, ReservationRecord, ReservationRow, UserRecord};
use crate::config::DataConfig;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Provider of the reservation and user tables.
pub trait ReservationSource {
    /// Finished, started and cancelled reservations used for training.
    fn past_reservations(&self) -> Result<Vec<ReservationRecord>, DataError>;

    /// Upcoming reservations to score.
    fn booked_reservations(&self) -> Result<Vec<ReservationRecord>, DataError>;

    fn users(&self) -> Result<Vec<UserRecord>, DataError>;

    /// Reservations left-joined with their users.
    fn load_rows(&self, booked: bool) -> Result<Vec<ReservationRow>, DataError> {
        let reservations = if booked {
            self.booked_reservations()?
        } else {
            self.past_reservations()?
        };
        let users = self.users()?;
        let rows = join_users(reservations, users);
        info!(rows = rows.len(), booked, "loaded reservation rows");
        Ok(rows)
    }
}

/// Reads the three tables from CSV files with headers.
#[derive(Debug, Clone)]
pub struct CsvSource {
    past_reservations: PathBuf,
    booked_reservations: PathBuf,
    users: PathBuf,
}

impl CsvSource {
    pub fn new(
        past_reservations: impl Into<PathBuf>,
        booked_reservations: impl Into<PathBuf>,
        users: impl Into<PathBuf>,
    ) -> Self {
        Self {
            past_reservations: past_reservations.into(),
            booked_reservations: booked_reservations.into(),
            users: users.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(
            &config.past_reservations,
            &config.booked_reservations,
            &config.users,
        )
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(records)
}

impl ReservationSource for CsvSource {
    fn past_reservations(&self) -> Result<Vec<ReservationRecord>, DataError> {
        read_csv(&self.past_reservations)
    }

    fn booked_reservations(&self) -> Result<Vec<ReservationRecord>, DataError> {
        read_csv(&self.booked_reservations)
    }

    fn users(&self) -> Result<Vec<UserRecord>, DataError> {
        read_csv(&self.users)
    }
}
