//! Hydrological Data Service - Main Daemon
//!
//! Serves the simulated monitoring fleet over HTTP:
//! 1. Loads service.toml (plus .env / HIDRO_* overrides)
//! 2. Generates the seed fleet of stations and reservoirs once
//! 3. Serves read-only JSON queries, statistics and a health signal
//!
//! Usage:
//!   cargo run --release                          # Listen on the configured port
//!   cargo run --release -- --port 9090           # Override the port
//!   cargo run --release -- --config other.toml   # Use another config file

use hidro_service::config::{self, DEFAULT_CONFIG_PATH};
use hidro_service::endpoint;
use hidro_service::logging::{self, Component};
use hidro_service::repository::Repository;
use hidro_service::statistics;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

fn usage(program: &str) -> String {
    format!("Usage: {} [--config PATH] [--port PORT]", program)
}

fn main() {
    println!("🌊 Hydrological Data Service");
    println!("============================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut port_override: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            "--port" if i + 1 < args.len() => match args[i + 1].parse() {
                Ok(port) => {
                    port_override = Some(port);
                    i += 2;
                }
                Err(_) => {
                    eprintln!("Error: invalid port '{}'", args[i + 1]);
                    std::process::exit(1);
                }
            },
            "--help" | "-h" => {
                println!("{}", usage(&args[0]));
                return;
            }
            other => {
                eprintln!("Unknown or incomplete argument: {}", other);
                eprintln!("{}", usage(&args[0]));
                std::process::exit(1);
            }
        }
    }

    let mut config = match config::load_service_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = port_override {
        config.server.port = port;
    }

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );
    logging::info(
        Component::Config,
        None,
        &format!("Loaded configuration (listen {})", config.listen_address()),
    );

    // Seed the in-memory fleet; it is never mutated after this point
    let repo = Arc::new(Repository::seeded());
    logging::info(
        Component::Repository,
        None,
        &format!(
            "Seeded {} stations and {} reservoirs",
            repo.list_water_levels().len(),
            repo.list_reservoirs().len()
        ),
    );

    let health = statistics::evaluate_health(&repo);
    if health.healthy {
        logging::info(Component::System, None, "Initial health check: healthy");
    } else {
        logging::warn(
            Component::System,
            None,
            &format!(
                "Initial health check: unhealthy (emergency stations: {:?}, out of service: {:?})",
                health.emergency_stations, health.out_of_service_reservoirs
            ),
        );
    }

    if let Err(e) = endpoint::start_endpoint_server(&config.server, repo) {
        logging::error(Component::Http, None, &e.to_string());
        eprintln!("\n❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
