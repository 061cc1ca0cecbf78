//! Raw reservation, user and interactive records.

use crate::features::FlagValue;
use ndarray::Array1;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Identifier of a user across reservations.
pub type UserId = i64;

/// Final state of a past reservation, as the classifier sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The ride happened (`finished` or `started`).
    Completed,
    /// Anything else: cancelled, no-show, expired.
    Cancelled,
}

impl Outcome {
    /// Derive the outcome from a reservation's `current_state`.
    pub fn from_state(state: &str) -> Self {
        match state.trim() {
            "finished" | "started" => Outcome::Completed,
            _ => Outcome::Cancelled,
        }
    }

    /// Interpret a 0/1 training label. Other values are rejected.
    pub fn from_label(label: f64) -> Option<Self> {
        if label == 0.0 {
            Some(Outcome::Completed)
        } else if label == 1.0 {
            Some(Outcome::Cancelled)
        } else {
            None
        }
    }

    pub fn as_label(self) -> f64 {
        match self {
            Outcome::Completed => 0.0,
            Outcome::Cancelled => 1.0,
        }
    }

    pub fn is_cancelled(self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// Accepts `t`/`f` exports as well as the flag table of [`FlagValue`].
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlagValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagValue::Text(text)) => match text.trim() {
            "" => Ok(None),
            "t" => Ok(Some(true)),
            "f" => Ok(Some(false)),
            _ => FlagValue::Text(text)
                .normalize("insurance")
                .map(|v| Some(v == 1.0))
                .map_err(D::Error::custom),
        },
        Some(value) => value
            .normalize("insurance")
            .map(|v| Some(v == 1.0))
            .map_err(D::Error::custom),
    }
}

/// One row of the reservations table.
///
/// Timestamps are numeric day offsets from the configured epoch. The
/// `time_zone` column comes pre-joined from the location table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: Option<i64>,
    pub user_id: UserId,
    pub promo_code_id: Option<i64>,
    pub location: Option<i64>,
    pub created_at: Option<f64>,
    pub pickup: Option<f64>,
    pub dropoff: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub insurance_corporate: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub insurance_silvercar: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub insurance_personal: Option<bool>,
    pub booking_application: Option<String>,
    pub time_zone: Option<String>,
    pub current_state: Option<String>,
}

/// One row of the users table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub postal_code: Option<String>,
    pub updated_at: Option<f64>,
    pub created_at: Option<f64>,
}

/// A reservation left-joined with its user's profile.
///
/// Every field except `user_id` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationRow {
    pub id: Option<i64>,
    pub user_id: UserId,
    pub promo_code_id: Option<i64>,
    pub location: Option<i64>,
    pub created_at: Option<f64>,
    pub pickup: Option<f64>,
    pub dropoff: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub insurance_corporate: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub insurance_silvercar: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub insurance_personal: Option<bool>,
    pub booking_application: Option<String>,
    pub postal_code: Option<String>,
    pub updated_at: Option<f64>,
    pub created_at_user: Option<f64>,
    pub time_zone: Option<String>,
    pub current_state: Option<String>,
}

impl ReservationRow {
    /// Join a reservation with an optional user profile.
    pub fn from_parts(reservation: ReservationRecord, user: Option<&UserRecord>) -> Self {
        Self {
            id: reservation.id,
            user_id: reservation.user_id,
            promo_code_id: reservation.promo_code_id,
            location: reservation.location,
            created_at: reservation.created_at,
            pickup: reservation.pickup,
            dropoff: reservation.dropoff,
            insurance_corporate: reservation.insurance_corporate,
            insurance_silvercar: reservation.insurance_silvercar,
            insurance_personal: reservation.insurance_personal,
            booking_application: reservation.booking_application,
            postal_code: user.and_then(|u| u.postal_code.clone()),
            updated_at: user.and_then(|u| u.updated_at),
            created_at_user: user.and_then(|u| u.created_at),
            time_zone: reservation.time_zone,
            current_state: reservation.current_state,
        }
    }

    /// Outcome derived from `current_state`. A missing state counts as a
    /// cancellation, like any state other than `finished` or `started`.
    pub fn outcome(&self) -> Outcome {
        self.current_state
            .as_deref()
            .map_or(Outcome::Cancelled, Outcome::from_state)
    }
}

/// Left join of reservations onto users by `user_id`.
///
/// Row order follows `reservations`. When a user id appears more than once in
/// `users`, the first record wins.
pub fn join_users(reservations: Vec<ReservationRecord>, users: Vec<UserRecord>) -> Vec<ReservationRow> {
    let mut by_id: HashMap<UserId, UserRecord> = HashMap::with_capacity(users.len());
    let mut duplicates = 0usize;
    for user in users {
        if by_id.contains_key(&user.id) {
            duplicates += 1;
            continue;
        }
        by_id.insert(user.id, user);
    }
    if duplicates > 0 {
        warn!(duplicates, "duplicated user ids, keeping first record");
    }

    reservations
        .into_iter()
        .map(|reservation| {
            let user = by_id.get(&reservation.user_id);
            ReservationRow::from_parts(reservation, user)
        })
        .collect()
}

/// 0/1 cancellation labels of `rows`, in row order.
pub fn split_labels(rows: &[ReservationRow]) -> Array1<f64> {
    rows.iter().map(|row| row.outcome().as_label()).collect()
}

/// A single reservation typed in by a user.
///
/// Dates are free-form strings; flags accept Yes/No, booleans and 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualReservation {
    pub created_at: String,
    pub pickup: String,
    pub dropoff: String,
    /// `Corporate`, `Silvercar`, `Personal` or anything else for none.
    #[serde(default)]
    pub insurance: String,
    pub location: i64,
    #[serde(default)]
    pub past_finished: f64,
    #[serde(default)]
    pub past_cancellations: f64,
    pub used_promo: FlagValue,
    pub credit_card: FlagValue,
    pub web_booking: FlagValue,
    pub modified_profile: FlagValue,
}
