/// In-memory repository for the seeded collections.
///
/// Owns both record collections for the lifetime of the process. Each
/// collection is an insertion-ordered `Vec` plus a key → index map built
/// once at construction, giving O(1) point lookups. Filters are linear scans.
///
/// Nothing is mutated after construction, so a `Repository` can be shared
/// across worker threads behind an `Arc` without any locking.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use crate::model::{
    AlertStatus, OperationalStatus, PrimaryUse, ReservoirRecord, SourceType, WaterLevelRecord,
};
use crate::seed;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a caller-supplied fleet is rejected by `Repository::from_records`.
#[derive(Debug, PartialEq)]
pub enum RepositoryError {
    DuplicateStationId(String),
    DuplicateReservoirId(String),
    /// A record violated one or more field constraints.
    InvalidRecord { id: String, violations: Vec<String> },
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::DuplicateStationId(id) => write!(f, "Duplicate station id: {}", id),
            RepositoryError::DuplicateReservoirId(id) => {
                write!(f, "Duplicate reservoir id: {}", id)
            }
            RepositoryError::InvalidRecord { id, violations } => {
                write!(f, "Invalid record {}: {}", id, violations.join("; "))
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Repository {
    water_levels: Vec<WaterLevelRecord>,
    reservoirs: Vec<ReservoirRecord>,
    station_index: HashMap<String, usize>,
    reservoir_index: HashMap<String, usize>,
}

impl Repository {
    /// Builds the repository from the fixed seed fleet.
    pub fn seeded() -> Self {
        let fleet = seed::generate();
        Self::index(fleet.water_levels, fleet.reservoirs)
    }

    /// Builds a repository from arbitrary collections, rejecting invalid
    /// records and duplicate keys.
    pub fn from_records(
        water_levels: Vec<WaterLevelRecord>,
        reservoirs: Vec<ReservoirRecord>,
    ) -> Result<Self, RepositoryError> {
        for station in &water_levels {
            let violations = station.validate();
            if !violations.is_empty() {
                return Err(RepositoryError::InvalidRecord {
                    id: station.station_id.clone(),
                    violations,
                });
            }
        }
        for reservoir in &reservoirs {
            let violations = reservoir.validate();
            if !violations.is_empty() {
                return Err(RepositoryError::InvalidRecord {
                    id: reservoir.reservoir_id.clone(),
                    violations,
                });
            }
        }

        let repo = Self::index(water_levels, reservoirs);

        if repo.station_index.len() != repo.water_levels.len() {
            let id = first_duplicate(repo.water_levels.iter().map(|s| s.station_id.as_str()));
            return Err(RepositoryError::DuplicateStationId(id));
        }
        if repo.reservoir_index.len() != repo.reservoirs.len() {
            let id = first_duplicate(repo.reservoirs.iter().map(|r| r.reservoir_id.as_str()));
            return Err(RepositoryError::DuplicateReservoirId(id));
        }

        Ok(repo)
    }

    /// Builds the key maps. On a repeated key the first record wins.
    fn index(water_levels: Vec<WaterLevelRecord>, reservoirs: Vec<ReservoirRecord>) -> Self {
        let mut station_index = HashMap::with_capacity(water_levels.len());
        for (i, station) in water_levels.iter().enumerate() {
            if let Entry::Vacant(slot) = station_index.entry(station.station_id.clone()) {
                slot.insert(i);
            }
        }

        let mut reservoir_index = HashMap::with_capacity(reservoirs.len());
        for (i, reservoir) in reservoirs.iter().enumerate() {
            if let Entry::Vacant(slot) = reservoir_index.entry(reservoir.reservoir_id.clone()) {
                slot.insert(i);
            }
        }

        Self {
            water_levels,
            reservoirs,
            station_index,
            reservoir_index,
        }
    }

    // --- Water levels -------------------------------------------------------

    /// All stations, in insertion order.
    pub fn list_water_levels(&self) -> &[WaterLevelRecord] {
        &self.water_levels
    }

    /// Exact-match lookup on `stationId`. `None` is a normal outcome.
    pub fn get_water_level_by_station_id(&self, station_id: &str) -> Option<&WaterLevelRecord> {
        self.station_index
            .get(station_id)
            .map(|&i| &self.water_levels[i])
    }

    pub fn list_water_levels_by_type(&self, source_type: SourceType) -> Vec<&WaterLevelRecord> {
        self.water_levels
            .iter()
            .filter(|s| s.source_type == source_type)
            .collect()
    }

    pub fn list_water_levels_by_alert_status(
        &self,
        alert_status: AlertStatus,
    ) -> Vec<&WaterLevelRecord> {
        self.water_levels
            .iter()
            .filter(|s| s.alert_status == alert_status)
            .collect()
    }

    // --- Reservoirs ---------------------------------------------------------

    /// All reservoirs, in insertion order.
    pub fn list_reservoirs(&self) -> &[ReservoirRecord] {
        &self.reservoirs
    }

    /// Exact-match lookup on `reservoirId`. `None` is a normal outcome.
    pub fn get_reservoir_by_id(&self, reservoir_id: &str) -> Option<&ReservoirRecord> {
        self.reservoir_index
            .get(reservoir_id)
            .map(|&i| &self.reservoirs[i])
    }

    pub fn list_reservoirs_by_primary_use(&self, primary_use: PrimaryUse) -> Vec<&ReservoirRecord> {
        self.reservoirs
            .iter()
            .filter(|r| r.primary_use == primary_use)
            .collect()
    }

    pub fn list_reservoirs_by_status(&self, status: OperationalStatus) -> Vec<&ReservoirRecord> {
        self.reservoirs
            .iter()
            .filter(|r| r.status == status)
            .collect()
    }
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .find(|id| !seen.insert(*id))
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
