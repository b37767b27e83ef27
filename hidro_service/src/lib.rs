/// hidro_service: read-only hydrological monitoring data service.
///
/// # Module structure
///
/// ```text
/// hidro_service
/// ├── model       — record types, categorical enums, reports, ParseEnumError
/// ├── seed        — fixed seed fleet of stations and reservoirs
/// ├── repository  — in-memory collections with key index and filters
/// ├── statistics  — system statistics and the health verdict
/// ├── endpoint    — HTTP API (routing, status mapping, worker pool)
/// ├── config      — service configuration loader (service.toml + HIDRO_* env)
/// └── logging     — leveled, component-tagged logger
/// ```

/// Public modules
pub mod config;
pub mod endpoint;
pub mod logging;
pub mod model;
pub mod repository;
pub mod seed;
pub mod statistics;
