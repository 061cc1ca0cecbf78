//! Per-user outcome history and the features derived from it.
//!
//! The store is appended to only while fitting, one row at a time in row
//! order, and the snapshot for a row is always taken *before* that row's own
//! outcome is recorded. A user's features at row `i` therefore reflect exactly
//! the outcomes of that user's strictly earlier rows.

use crate::data::{Outcome, ReservationRow, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Count of a user's past rides and cancellations at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub rides: usize,
    pub cancellations: usize,
}

impl HistorySnapshot {
    /// Cancellation rate, or `fallback` when there are no rides yet.
    pub fn percent_cancelled(&self, fallback: f64) -> f64 {
        if self.rides == 0 {
            fallback
        } else {
            self.cancellations as f64 / self.rides as f64
        }
    }
}

/// User id → ordered list of recorded outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStore {
    outcomes: HashMap<UserId, Vec<Outcome>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the user's history.
    pub fn record_outcome(&mut self, user: UserId, outcome: Outcome) {
        self.outcomes.entry(user).or_default().push(outcome);
    }

    /// Current counts for `user`. Unknown users have an empty history.
    pub fn snapshot_for(&self, user: UserId) -> HistorySnapshot {
        self.outcomes
            .get(&user)
            .map(|history| HistorySnapshot {
                rides: history.len(),
                cancellations: history.iter().filter(|o| o.is_cancelled()).count(),
            })
            .unwrap_or_default()
    }

    pub fn outcomes_for(&self, user: UserId) -> &[Outcome] {
        self.outcomes.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn user_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn total_outcomes(&self) -> usize {
        self.outcomes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// `past_rides`, `past_cancellations` and `past_percent_cancelled` of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistoricalFeatures {
    pub past_rides: f64,
    pub past_cancellations: f64,
    pub past_percent_cancelled: f64,
}

impl HistoricalFeatures {
    pub fn from_snapshot(snapshot: HistorySnapshot, population_rate: f64) -> Self {
        Self {
            past_rides: snapshot.rides as f64,
            past_cancellations: snapshot.cancellations as f64,
            past_percent_cancelled: snapshot.percent_cancelled(population_rate),
        }
    }

    /// Features of an interactive record, where the user reports finished and
    /// cancelled ride counts directly.
    pub fn from_counts(past_finished: f64, past_cancellations: f64, population_rate: f64) -> Self {
        let past_rides = past_finished + past_cancellations;
        let past_percent_cancelled = if past_rides == 0.0 {
            population_rate
        } else {
            past_cancellations / past_rides
        };
        Self {
            past_rides,
            past_cancellations,
            past_percent_cancelled,
        }
    }
}

/// Mean cancellation rate over the training labels, 0 when there are none.
pub fn population_rate(labels: &[Outcome]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let cancelled = labels.iter().filter(|o| o.is_cancelled()).count();
    cancelled as f64 / labels.len() as f64
}

/// Build historical features for training rows, recording each row's outcome
/// after its snapshot is taken.
///
/// `labels` must be aligned with `rows`.
pub fn record_training_history(
    store: &mut HistoryStore,
    rows: &[ReservationRow],
    labels: &[Outcome],
    population_rate: f64,
) -> Vec<HistoricalFeatures> {
    debug_assert_eq!(rows.len(), labels.len());
    rows.iter()
        .zip(labels)
        .map(|(row, &outcome)| {
            let snapshot = store.snapshot_for(row.user_id);
            store.record_outcome(row.user_id, outcome);
            HistoricalFeatures::from_snapshot(snapshot, population_rate)
        })
        .collect()
}

/// Build historical features from the store without modifying it.
pub fn snapshot_history(
    store: &HistoryStore,
    rows: &[ReservationRow],
    population_rate: f64,
) -> Vec<HistoricalFeatures> {
    rows.iter()
        .map(|row| HistoricalFeatures::from_snapshot(store.snapshot_for(row.user_id), population_rate))
        .collect()
}
