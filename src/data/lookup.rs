//! Time zone lookup for interactive pickups.

use super::error::{DataError, LookupError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Resolves the time zone label of a pickup location.
pub trait TimeZoneLookup {
    fn time_zone(&self, location: i64) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct LocationZone {
    location: i64,
    time_zone: String,
}

/// In-memory `location -> time zone` table.
#[derive(Debug, Clone, Default)]
pub struct StaticTimeZones {
    zones: HashMap<i64, String>,
}

impl StaticTimeZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, location: i64, time_zone: impl Into<String>) -> Self {
        self.insert(location, time_zone);
        self
    }

    pub fn insert(&mut self, location: i64, time_zone: impl Into<String>) {
        self.zones.insert(location, time_zone.into());
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Load a `location,time_zone` CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut zones = HashMap::new();
        for record in reader.deserialize() {
            let LocationZone {
                location,
                time_zone,
            } = record?;
            zones.entry(location).or_insert(time_zone);
        }
        Ok(Self { zones })
    }
}

impl TimeZoneLookup for StaticTimeZones {
    fn time_zone(&self, location: i64) -> Result<String, LookupError> {
        self.zones
            .get(&location)
            .cloned()
            .ok_or(LookupError::UnknownLocation(location))
    }
}
