/// WaterLevelRecord, ReservoirRecord, the categorical enums, report types
/// core data structures and parse errors
///
/// Core data types for the hydrological data service.
///
/// This module defines the shared domain model imported by all other modules.
/// Besides the types it only holds the literal tables for the categorical
/// enums, record validation and the wire format for timestamps. No I/O.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Timestamp wire format
// ---------------------------------------------------------------------------

/// Every timestamp in a response body is rendered as `yyyy-MM-dd HH:mm:ss`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serde adapter for `NaiveDateTime` fields using [`TIMESTAMP_FORMAT`].
pub mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Categorical enums
// ---------------------------------------------------------------------------

/// Raised when an external string matches no literal of a categorical enum.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseEnumError {
    /// Human-readable name of the enum, e.g. "source type".
    pub kind: &'static str,
    /// The rejected input, exactly as received.
    pub input: String,
    /// Canonical literals the parser accepts.
    pub accepted: &'static [&'static str],
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {}: '{}'. Accepted values: {}",
            self.kind,
            self.input,
            self.accepted.join(", ")
        )
    }
}

impl std::error::Error for ParseEnumError {}

/// Declares a closed literal set together with its display-name table.
///
/// Each variant maps to `(canonical literal, legacy alias, display name)`.
/// Parsing is case-insensitive and accepts either the literal or the alias;
/// serialization always emits the canonical literal.
macro_rules! categorical_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($literal:literal, $alias:literal, $display:literal),
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $literal)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical literals in declaration order.
            pub const LITERALS: &'static [&'static str] = &[$($literal),+];

            pub fn literal(self) -> &'static str {
                match self {
                    $($name::$variant => $literal,)+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $($name::$variant => $display,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.literal())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.to_uppercase();
                $(
                    if normalized == $literal || normalized == $alias {
                        return Ok($name::$variant);
                    }
                )+
                Err(ParseEnumError {
                    kind: $kind,
                    input: s.to_string(),
                    accepted: Self::LITERALS,
                })
            }
        }
    };
}

categorical_enum! {
    /// Where a water-level measurement is taken.
    pub enum SourceType ("source type") {
        River => ("RIVER", "RIO", "Río"),
        Reservoir => ("RESERVOIR", "EMBALSE", "Embalse"),
        Lake => ("LAKE", "LAGO", "Lago"),
        Aquifer => ("AQUIFER", "ACUIFERO", "Acuífero"),
    }
}

categorical_enum! {
    /// Severity tier of a monitored water level, in ascending order.
    pub enum AlertStatus ("alert status") {
        Normal => ("NORMAL", "NORMAL", "Normal"),
        Caution => ("CAUTION", "PRECAUCION", "Precaución"),
        Alert => ("ALERT", "ALERTA", "Alerta"),
        Emergency => ("EMERGENCY", "EMERGENCIA", "Emergencia"),
    }
}

categorical_enum! {
    /// Principal function of a reservoir.
    pub enum PrimaryUse ("primary use") {
        Hydroelectric => ("HYDROELECTRIC", "HIDROELECTRICA", "Hidroeléctrica"),
        WaterSupply => ("WATER_SUPPLY", "ABASTECIMIENTO", "Abastecimiento urbano"),
        Irrigation => ("IRRIGATION", "RIEGO", "Riego agrícola"),
        FloodControl => ("FLOOD_CONTROL", "CONTROL_AVENIDAS", "Control de avenidas"),
        Recreational => ("RECREATIONAL", "RECREATIVO", "Uso recreativo"),
        Industrial => ("INDUSTRIAL", "INDUSTRIAL", "Uso industrial"),
    }
}

categorical_enum! {
    /// Lifecycle state of a reservoir's infrastructure.
    pub enum OperationalStatus ("operational status") {
        Operational => ("OPERATIONAL", "OPERATIVO", "Operativo"),
        Maintenance => ("MAINTENANCE", "MANTENIMIENTO", "En mantenimiento"),
        OutOfService => ("OUT_OF_SERVICE", "FUERA_SERVICIO", "Fuera de servicio"),
        Emergency => ("EMERGENCY", "EMERGENCIA", "Emergencia"),
    }
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Latest measurement from a single hydrological station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterLevelRecord {
    pub station_id: String,
    pub station_name: String,
    /// Meters.
    pub water_level: f64,
    /// m³/s.
    pub flow: Option<f64>,
    pub source_type: SourceType,
    pub alert_status: AlertStatus,
    pub location: String,
    #[serde(with = "timestamp_format")]
    pub last_updated: NaiveDateTime,
    /// Degrees Celsius.
    pub temperature: Option<f64>,
    pub observations: Option<String>,
}

impl WaterLevelRecord {
    /// Returns one message per violated field constraint; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.station_id.trim().is_empty() {
            violations.push("stationId must not be blank".to_string());
        }
        if self.station_name.trim().is_empty() {
            violations.push("stationName must not be blank".to_string());
        }
        if !(self.water_level > 0.0) {
            violations.push(format!("waterLevel must be positive, got {}", self.water_level));
        }
        if let Some(flow) = self.flow {
            if !(flow > 0.0) {
                violations.push(format!("flow must be positive, got {}", flow));
            }
        }

        violations
    }
}

/// Metadata and current storage for a dam/reservoir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirRecord {
    pub reservoir_id: String,
    pub name: String,
    /// Million m³.
    pub max_capacity: f64,
    /// Million m³.
    pub current_volume: f64,
    /// Stored as reported; see `derived_fill_percentage`.
    pub fill_percentage: f64,
    pub primary_use: PrimaryUse,
    pub status: OperationalStatus,
    pub location: String,
    pub main_river: String,
    pub construction_year: Option<i32>,
    /// Meters.
    pub dam_height: Option<f64>,
    /// Meters.
    pub dam_length: Option<f64>,
    /// m³/s.
    pub outflow: Option<f64>,
    #[serde(with = "timestamp_format")]
    pub last_updated: NaiveDateTime,
    pub observations: Option<String>,
}

impl ReservoirRecord {
    /// `current_volume / max_capacity * 100`, independent of the stored
    /// `fill_percentage`.
    pub fn derived_fill_percentage(&self) -> f64 {
        if self.max_capacity > 0.0 {
            self.current_volume / self.max_capacity * 100.0
        } else {
            0.0
        }
    }

    /// Returns one message per violated field constraint; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.reservoir_id.trim().is_empty() {
            violations.push("reservoirId must not be blank".to_string());
        }
        if self.name.trim().is_empty() {
            violations.push("name must not be blank".to_string());
        }
        if !(self.max_capacity > 0.0) {
            violations.push(format!("maxCapacity must be positive, got {}", self.max_capacity));
        }
        if !(self.current_volume > 0.0) {
            violations.push(format!(
                "currentVolume must be positive, got {}",
                self.current_volume
            ));
        }
        if !(0.0..=100.0).contains(&self.fill_percentage) {
            violations.push(format!(
                "fillPercentage must be within [0, 100], got {}",
                self.fill_percentage
            ));
        }
        for (field, value) in [("damHeight", self.dam_height), ("damLength", self.dam_length)] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    violations.push(format!("{} must be positive, got {}", field, v));
                }
            }
        }

        violations
    }
}

// ---------------------------------------------------------------------------
// Derived reports
// ---------------------------------------------------------------------------

/// System-wide summary, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub total_stations: usize,
    pub total_reservoirs: usize,
    /// Stations whose alert status is anything but NORMAL.
    pub alert_station_count: usize,
    /// Mean stored fill percentage; 0.0 with no reservoirs.
    pub average_fill_percentage: f64,
    #[serde(with = "timestamp_format")]
    pub generated_at: NaiveDateTime,
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sistema Hidrológico - Estadísticas:")?;
        writeln!(f, "- Total de estaciones: {}", self.total_stations)?;
        writeln!(f, "- Total de embalses: {}", self.total_reservoirs)?;
        writeln!(f, "- Estaciones en alerta: {}", self.alert_station_count)?;
        writeln!(f, "- Promedio de llenado de embalses: {:.1}%", self.average_fill_percentage)?;
        write!(f, "- Última actualización: {}", self.generated_at.format(TIMESTAMP_FORMAT))
    }
}

/// Health verdict together with the records that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub healthy: bool,
    /// Station ids currently in EMERGENCY.
    pub emergency_stations: Vec<String>,
    /// Reservoir ids currently OUT_OF_SERVICE.
    pub out_of_service_reservoirs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn sample_station() -> WaterLevelRecord {
        WaterLevelRecord {
            station_id: "HIDRO_TEST".to_string(),
            station_name: "Río de prueba".to_string(),
            water_level: 2.0,
            flow: Some(10.0),
            source_type: SourceType::River,
            alert_status: AlertStatus::Normal,
            location: "Test".to_string(),
            last_updated: sample_timestamp(),
            temperature: None,
            observations: None,
        }
    }

    fn sample_reservoir() -> ReservoirRecord {
        ReservoirRecord {
            reservoir_id: "EMB_TEST".to_string(),
            name: "Embalse de prueba".to_string(),
            max_capacity: 200.0,
            current_volume: 150.0,
            fill_percentage: 75.0,
            primary_use: PrimaryUse::Irrigation,
            status: OperationalStatus::Operational,
            location: "Test".to_string(),
            main_river: "Río Test".to_string(),
            construction_year: Some(1970),
            dam_height: Some(40.0),
            dam_length: Some(300.0),
            outflow: None,
            last_updated: sample_timestamp(),
            observations: None,
        }
    }

    // --- Enum parsing -------------------------------------------------------

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("river".parse::<SourceType>(), Ok(SourceType::River));
        assert_eq!("Reservoir".parse::<SourceType>(), Ok(SourceType::Reservoir));
        assert_eq!("alert".parse::<AlertStatus>(), Ok(AlertStatus::Alert));
        assert_eq!("water_supply".parse::<PrimaryUse>(), Ok(PrimaryUse::WaterSupply));
        assert_eq!(
            "Out_Of_Service".parse::<OperationalStatus>(),
            Ok(OperationalStatus::OutOfService)
        );
    }

    #[test]
    fn test_enum_parsing_accepts_legacy_aliases() {
        assert_eq!("embalse".parse::<SourceType>(), Ok(SourceType::Reservoir));
        assert_eq!("PRECAUCION".parse::<AlertStatus>(), Ok(AlertStatus::Caution));
        assert_eq!("control_avenidas".parse::<PrimaryUse>(), Ok(PrimaryUse::FloodControl));
        assert_eq!(
            "fuera_servicio".parse::<OperationalStatus>(),
            Ok(OperationalStatus::OutOfService)
        );
    }

    #[test]
    fn test_unknown_literal_reports_accepted_values() {
        let err = "OCEANO".parse::<SourceType>().unwrap_err();
        assert_eq!(err.kind, "source type");
        assert_eq!(err.input, "OCEANO");
        assert_eq!(err.accepted, &["RIVER", "RESERVOIR", "LAKE", "AQUIFER"]);

        let message = err.to_string();
        assert!(message.contains("OCEANO"));
        assert!(message.contains("RIVER, RESERVOIR, LAKE, AQUIFER"));
    }

    #[test]
    fn test_padded_input_is_not_a_literal() {
        assert!(" RIVER ".parse::<SourceType>().is_err());
        assert!("\toperational\n".parse::<OperationalStatus>().is_err());
        assert!("NORMAL ".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_every_literal_parses_back_to_its_variant() {
        for v in SourceType::ALL {
            assert_eq!(v.literal().parse::<SourceType>(), Ok(*v));
        }
        for v in AlertStatus::ALL {
            assert_eq!(v.literal().parse::<AlertStatus>(), Ok(*v));
        }
        for v in PrimaryUse::ALL {
            assert_eq!(v.literal().parse::<PrimaryUse>(), Ok(*v));
        }
        for v in OperationalStatus::ALL {
            assert_eq!(v.literal().parse::<OperationalStatus>(), Ok(*v));
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(SourceType::River.display_name(), "Río");
        assert_eq!(AlertStatus::Caution.display_name(), "Precaución");
        assert_eq!(PrimaryUse::WaterSupply.display_name(), "Abastecimiento urbano");
        assert_eq!(OperationalStatus::Maintenance.display_name(), "En mantenimiento");
    }

    // --- Serialization ------------------------------------------------------

    #[test]
    fn test_station_serializes_with_camel_case_fields_and_literal_enums() {
        let json = serde_json::to_value(sample_station()).unwrap();
        assert_eq!(json["stationId"], "HIDRO_TEST");
        assert_eq!(json["waterLevel"], 2.0);
        assert_eq!(json["sourceType"], "RIVER");
        assert_eq!(json["alertStatus"], "NORMAL");
        assert_eq!(json["lastUpdated"], "2024-03-14 09:26:53");
        assert!(json["temperature"].is_null());
    }

    #[test]
    fn test_reservoir_serializes_multi_word_enum_literals() {
        let mut reservoir = sample_reservoir();
        reservoir.primary_use = PrimaryUse::FloodControl;
        reservoir.status = OperationalStatus::OutOfService;

        let json = serde_json::to_value(&reservoir).unwrap();
        assert_eq!(json["primaryUse"], "FLOOD_CONTROL");
        assert_eq!(json["status"], "OUT_OF_SERVICE");
        assert_eq!(json["mainRiver"], "Río Test");
        assert_eq!(json["constructionYear"], 1970);
    }

    #[test]
    fn test_timestamp_format_rejects_iso_t_separator() {
        let json = r#"{
            "totalStations": 1, "totalReservoirs": 1, "alertStationCount": 0,
            "averageFillPercentage": 50.0, "generatedAt": "2024-03-14T09:26:53"
        }"#;
        assert!(serde_json::from_str::<StatisticsReport>(json).is_err());
    }

    // --- Validation ---------------------------------------------------------

    #[test]
    fn test_valid_records_have_no_violations() {
        assert!(sample_station().validate().is_empty());
        assert!(sample_reservoir().validate().is_empty());
    }

    #[test]
    fn test_station_validation_flags_each_bad_field() {
        let mut station = sample_station();
        station.station_id = "  ".to_string();
        station.water_level = 0.0;
        station.flow = Some(-1.0);

        let violations = station.validate();
        assert_eq!(violations.len(), 3, "got {:?}", violations);
        assert!(violations.iter().any(|v| v.contains("stationId")));
        assert!(violations.iter().any(|v| v.contains("waterLevel")));
        assert!(violations.iter().any(|v| v.contains("flow")));
    }

    #[test]
    fn test_reservoir_validation_flags_fill_percentage_out_of_range() {
        let mut reservoir = sample_reservoir();
        reservoir.fill_percentage = 100.5;
        reservoir.dam_height = Some(0.0);

        let violations = reservoir.validate();
        assert_eq!(violations.len(), 2, "got {:?}", violations);
        assert!(violations.iter().any(|v| v.contains("fillPercentage")));
        assert!(violations.iter().any(|v| v.contains("damHeight")));
    }

    #[test]
    fn test_derived_fill_percentage_is_independent_of_stored_value() {
        let mut reservoir = sample_reservoir();
        reservoir.fill_percentage = 10.0;
        assert_eq!(reservoir.derived_fill_percentage(), 75.0);
        assert_eq!(reservoir.fill_percentage, 10.0);
    }

    #[test]
    fn test_statistics_report_text_rounds_to_one_decimal() {
        let report = StatisticsReport {
            total_stations: 5,
            total_reservoirs: 5,
            alert_station_count: 2,
            average_fill_percentage: 71.29999,
            generated_at: sample_timestamp(),
        };
        let text = report.to_string();
        assert!(text.starts_with("Sistema Hidrológico - Estadísticas:"));
        assert!(text.contains("Total de estaciones: 5"));
        assert!(text.contains("Estaciones en alerta: 2"));
        assert!(text.contains("71.3%"));
        assert!(text.ends_with("2024-03-14 09:26:53"));
    }
}
