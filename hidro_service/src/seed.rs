/// Seed fleet for the hydrological data service.
///
/// Defines the fixed demonstration set of monitoring stations and
/// reservoirs served by the API. The collections are built exactly once at
/// startup; each record's `lastUpdated` is "now minus N minutes", with N
/// taken from the table below to simulate staggered measurement times.

use chrono::{Duration, Local, NaiveDateTime};

use crate::model::{
    AlertStatus, OperationalStatus, PrimaryUse, ReservoirRecord, SourceType, WaterLevelRecord,
};

// ---------------------------------------------------------------------------
// Seed tables
// ---------------------------------------------------------------------------

/// Static description of one seeded station.
pub struct StationSeed {
    pub station_id: &'static str,
    pub station_name: &'static str,
    pub water_level: f64,
    pub flow: Option<f64>,
    pub source_type: SourceType,
    pub alert_status: AlertStatus,
    pub location: &'static str,
    /// Age of the measurement at generation time.
    pub minutes_ago: i64,
    pub temperature: Option<f64>,
    pub observations: &'static str,
}

/// Static description of one seeded reservoir.
pub struct ReservoirSeed {
    pub reservoir_id: &'static str,
    pub name: &'static str,
    pub max_capacity: f64,
    pub current_volume: f64,
    pub fill_percentage: f64,
    pub primary_use: PrimaryUse,
    pub status: OperationalStatus,
    pub location: &'static str,
    pub main_river: &'static str,
    pub construction_year: Option<i32>,
    pub dam_height: Option<f64>,
    pub dam_length: Option<f64>,
    pub outflow: Option<f64>,
    /// Age of the measurement at generation time.
    pub minutes_ago: i64,
    pub observations: &'static str,
}

/// Monitoring stations, in insertion order.
pub static STATION_SEEDS: &[StationSeed] = &[
    StationSeed {
        station_id: "HIDRO_001",
        station_name: "Río Ebro - Zaragoza",
        water_level: 2.45,
        flow: Some(125.8),
        source_type: SourceType::River,
        alert_status: AlertStatus::Normal,
        location: "Zaragoza, Aragón",
        minutes_ago: 15,
        temperature: Some(18.5),
        observations: "Condiciones normales de navegación",
    },
    StationSeed {
        station_id: "HIDRO_002",
        station_name: "Río Tajo - Toledo",
        water_level: 1.89,
        flow: Some(78.2),
        source_type: SourceType::River,
        alert_status: AlertStatus::Caution,
        location: "Toledo, Castilla-La Mancha",
        minutes_ago: 10,
        temperature: Some(19.2),
        observations: "Nivel ligeramente por debajo de lo normal",
    },
    StationSeed {
        station_id: "HIDRO_003",
        station_name: "Río Guadalquivir - Sevilla",
        water_level: 3.12,
        flow: Some(89.5),
        source_type: SourceType::River,
        alert_status: AlertStatus::Normal,
        location: "Sevilla, Andalucía",
        minutes_ago: 5,
        temperature: Some(21.8),
        observations: "Caudal estable, condiciones óptimas",
    },
    StationSeed {
        station_id: "HIDRO_004",
        station_name: "Embalse de Buendía",
        water_level: 15.67,
        flow: Some(45.3),
        source_type: SourceType::Reservoir,
        alert_status: AlertStatus::Alert,
        location: "Cuenca, Castilla-La Mancha",
        minutes_ago: 20,
        temperature: Some(16.9),
        observations: "Nivel alto debido a lluvias recientes",
    },
    StationSeed {
        station_id: "HIDRO_005",
        station_name: "Río Duero - Zamora",
        water_level: 2.78,
        flow: Some(156.7),
        source_type: SourceType::River,
        alert_status: AlertStatus::Normal,
        location: "Zamora, Castilla y León",
        minutes_ago: 8,
        temperature: Some(17.3),
        observations: "Flujo normal hacia Portugal",
    },
];

/// Reservoirs, in insertion order.
pub static RESERVOIR_SEEDS: &[ReservoirSeed] = &[
    ReservoirSeed {
        reservoir_id: "EMB_001",
        name: "Embalse de Mequinenza",
        max_capacity: 1534.0,
        current_volume: 980.5,
        fill_percentage: 63.9,
        primary_use: PrimaryUse::Hydroelectric,
        status: OperationalStatus::Operational,
        location: "Mequinenza, Zaragoza",
        main_river: "Río Ebro",
        construction_year: Some(1966),
        dam_height: Some(78.5),
        dam_length: Some(550.0),
        outflow: Some(45.2),
        minutes_ago: 30,
        observations: "Central hidroeléctrica funcionando a capacidad normal",
    },
    ReservoirSeed {
        reservoir_id: "EMB_002",
        name: "Embalse de Buendía",
        max_capacity: 1639.0,
        current_volume: 1245.8,
        fill_percentage: 76.0,
        primary_use: PrimaryUse::WaterSupply,
        status: OperationalStatus::Operational,
        location: "Cuenca, Castilla-La Mancha",
        main_river: "Río Guadiela",
        construction_year: Some(1958),
        dam_height: Some(78.0),
        dam_length: Some(340.0),
        outflow: Some(32.1),
        minutes_ago: 25,
        observations: "Reservas para abastecimiento en niveles óptimos",
    },
    ReservoirSeed {
        reservoir_id: "EMB_003",
        name: "Embalse de Alcántara",
        max_capacity: 3162.0,
        current_volume: 2456.7,
        fill_percentage: 77.7,
        primary_use: PrimaryUse::Hydroelectric,
        status: OperationalStatus::Operational,
        location: "Alcántara, Cáceres",
        main_river: "Río Tajo",
        construction_year: Some(1969),
        dam_height: Some(130.0),
        dam_length: Some(570.0),
        outflow: Some(67.8),
        minutes_ago: 40,
        observations: "Mayor embalse de España, funcionamiento normal",
    },
    ReservoirSeed {
        reservoir_id: "EMB_004",
        name: "Embalse de La Serena",
        max_capacity: 3219.0,
        current_volume: 1934.5,
        fill_percentage: 60.1,
        primary_use: PrimaryUse::Irrigation,
        status: OperationalStatus::Operational,
        location: "Castuera, Badajoz",
        main_river: "Río Zújar",
        construction_year: Some(1989),
        dam_height: Some(104.0),
        dam_length: Some(470.0),
        outflow: Some(28.9),
        minutes_ago: 35,
        observations: "Suministro de agua para regadíos extremeños",
    },
    ReservoirSeed {
        reservoir_id: "EMB_005",
        name: "Embalse de Riaño",
        max_capacity: 664.0,
        current_volume: 523.4,
        fill_percentage: 78.8,
        primary_use: PrimaryUse::WaterSupply,
        status: OperationalStatus::Maintenance,
        location: "Riaño, León",
        main_river: "Río Esla",
        construction_year: Some(1987),
        dam_height: Some(99.5),
        dam_length: Some(280.0),
        outflow: Some(15.6),
        minutes_ago: 50,
        observations: "En mantenimiento preventivo programado",
    },
];

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Both seeded collections, ready to hand to the repository.
#[derive(Debug, Clone)]
pub struct SeedFleet {
    pub water_levels: Vec<WaterLevelRecord>,
    pub reservoirs: Vec<ReservoirRecord>,
}

impl StationSeed {
    fn to_record(&self, now: NaiveDateTime) -> WaterLevelRecord {
        WaterLevelRecord {
            station_id: self.station_id.to_string(),
            station_name: self.station_name.to_string(),
            water_level: self.water_level,
            flow: self.flow,
            source_type: self.source_type,
            alert_status: self.alert_status,
            location: self.location.to_string(),
            last_updated: now - Duration::minutes(self.minutes_ago),
            temperature: self.temperature,
            observations: Some(self.observations.to_string()),
        }
    }
}

impl ReservoirSeed {
    fn to_record(&self, now: NaiveDateTime) -> ReservoirRecord {
        ReservoirRecord {
            reservoir_id: self.reservoir_id.to_string(),
            name: self.name.to_string(),
            max_capacity: self.max_capacity,
            current_volume: self.current_volume,
            fill_percentage: self.fill_percentage,
            primary_use: self.primary_use,
            status: self.status,
            location: self.location.to_string(),
            main_river: self.main_river.to_string(),
            construction_year: self.construction_year,
            dam_height: self.dam_height,
            dam_length: self.dam_length,
            outflow: self.outflow,
            last_updated: now - Duration::minutes(self.minutes_ago),
            observations: Some(self.observations.to_string()),
        }
    }
}

/// Builds the seed fleet relative to the given reference time.
pub fn generate_at(now: NaiveDateTime) -> SeedFleet {
    SeedFleet {
        water_levels: STATION_SEEDS.iter().map(|s| s.to_record(now)).collect(),
        reservoirs: RESERVOIR_SEEDS.iter().map(|r| r.to_record(now)).collect(),
    }
}

/// Builds the seed fleet relative to the current local time.
pub fn generate() -> SeedFleet {
    generate_at(Local::now().naive_local())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
