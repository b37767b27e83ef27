/// System-wide statistics and the health verdict.
///
/// Both are derived views: nothing here is cached, every call recomputes
/// against the repository's current collections.

use chrono::{Local, NaiveDateTime};

use crate::model::{
    AlertStatus, HealthReport, OperationalStatus, ReservoirRecord, StatisticsReport,
    WaterLevelRecord,
};
use crate::repository::Repository;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Computes the statistics report stamped with the current local time.
pub fn compute_statistics(repo: &Repository) -> StatisticsReport {
    compute_statistics_at(repo, Local::now().naive_local())
}

/// Computes the statistics report stamped with `generated_at`.
pub fn compute_statistics_at(repo: &Repository, generated_at: NaiveDateTime) -> StatisticsReport {
    let water_levels = repo.list_water_levels();
    let reservoirs = repo.list_reservoirs();

    StatisticsReport {
        total_stations: water_levels.len(),
        total_reservoirs: reservoirs.len(),
        alert_station_count: alert_station_count(water_levels),
        average_fill_percentage: average_fill_percentage(reservoirs),
        generated_at,
    }
}

/// Number of stations in CAUTION, ALERT or EMERGENCY.
pub fn alert_station_count(water_levels: &[WaterLevelRecord]) -> usize {
    water_levels
        .iter()
        .filter(|s| s.alert_status != AlertStatus::Normal)
        .count()
}

/// Arithmetic mean of the stored fill percentages; 0.0 when empty.
pub fn average_fill_percentage(reservoirs: &[ReservoirRecord]) -> f64 {
    if reservoirs.is_empty() {
        return 0.0;
    }
    let total: f64 = reservoirs.iter().map(|r| r.fill_percentage).sum();
    total / reservoirs.len() as f64
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Healthy iff no station is in EMERGENCY and no reservoir is OUT_OF_SERVICE.
pub fn evaluate_health(repo: &Repository) -> HealthReport {
    let emergency_stations: Vec<String> = repo
        .list_water_levels_by_alert_status(AlertStatus::Emergency)
        .into_iter()
        .map(|s| s.station_id.clone())
        .collect();

    let out_of_service_reservoirs: Vec<String> = repo
        .list_reservoirs_by_status(OperationalStatus::OutOfService)
        .into_iter()
        .map(|r| r.reservoir_id.clone())
        .collect();

    HealthReport {
        healthy: emergency_stations.is_empty() && out_of_service_reservoirs.is_empty(),
        emergency_stations,
        out_of_service_reservoirs,
    }
}

pub fn is_system_healthy(repo: &Repository) -> bool {
    evaluate_health(repo).healthy
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
