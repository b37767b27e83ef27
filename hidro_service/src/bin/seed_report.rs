//! Seed fleet report.
//!
//! Prints the seeded stations and reservoirs together with the derived
//! statistics and health verdict, without starting the HTTP server.
//!
//! Usage:
//!   cargo run --bin seed_report            # human-readable tables
//!   cargo run --bin seed_report -- --json  # full fleet as JSON

use hidro_service::model::TIMESTAMP_FORMAT;
use hidro_service::repository::Repository;
use hidro_service::statistics;
use serde_json::json;
use std::env;

fn main() {
    let as_json = env::args().skip(1).any(|a| a == "--json");
    let repo = Repository::seeded();

    if as_json {
        let document = json!({
            "waterLevels": repo.list_water_levels(),
            "reservoirs": repo.list_reservoirs(),
            "statistics": statistics::compute_statistics(&repo),
            "health": statistics::evaluate_health(&repo),
        });
        match serde_json::to_string_pretty(&document) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize fleet: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("📍 Stations");
    println!("{:<10} {:<30} {:>8} {:>8}  {:<12} {:<12} {}", "ID", "Name", "Level m", "Flow", "Type", "Alert", "Updated");
    for s in repo.list_water_levels() {
        println!(
            "{:<10} {:<30} {:>8.2} {:>8}  {:<12} {:<12} {}",
            s.station_id,
            s.station_name,
            s.water_level,
            s.flow.map(|f| format!("{:.1}", f)).unwrap_or_else(|| "-".to_string()),
            s.source_type.display_name(),
            s.alert_status.display_name(),
            s.last_updated.format(TIMESTAMP_FORMAT)
        );
    }

    println!("\n🏞  Reservoirs");
    println!("{:<8} {:<24} {:>9} {:>9} {:>6}  {:<22} {}", "ID", "Name", "Capacity", "Volume", "Fill%", "Use", "Status");
    for r in repo.list_reservoirs() {
        println!(
            "{:<8} {:<24} {:>9.1} {:>9.1} {:>6.1}  {:<22} {}",
            r.reservoir_id,
            r.name,
            r.max_capacity,
            r.current_volume,
            r.fill_percentage,
            r.primary_use.display_name(),
            r.status.display_name()
        );
    }

    println!("\n📊 {}", statistics::compute_statistics(&repo));

    let health = statistics::evaluate_health(&repo);
    if health.healthy {
        println!("\n✓ System healthy");
    } else {
        println!(
            "\n✗ System unhealthy - emergency stations: {:?}, out of service reservoirs: {:?}",
            health.emergency_stations, health.out_of_service_reservoirs
        );
    }
}
