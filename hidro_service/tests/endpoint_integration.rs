/// Integration tests for the HTTP endpoint
///
/// Each test binds the real server on an ephemeral localhost port, serves
/// the seed fleet from a background thread and talks to it over HTTP, so
/// the whole adapter (routing, status mapping, headers, JSON encoding,
/// worker pool) is exercised end to end.
///
/// Run with: cargo test --test endpoint_integration

use hidro_service::endpoint;
use hidro_service::model::OperationalStatus;
use hidro_service::repository::Repository;
use hidro_service::seed;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::Arc;
use std::thread;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Starts a server for `repo` and returns its base URL.
fn spawn_server(repo: Repository) -> String {
    let server = endpoint::bind("127.0.0.1", 0).expect("should bind an ephemeral port");
    let addr = endpoint::local_addr(&server).expect("server should listen on an IP socket");

    let repo = Arc::new(repo);
    thread::spawn(move || endpoint::serve(server, repo, 2));

    format!("http://{}", addr)
}

fn get(base: &str, path: &str) -> (StatusCode, Value) {
    let response = Client::new()
        .get(format!("{}{}", base, path))
        .send()
        .expect("request should complete");
    let status = response.status();
    let body = response.json::<Value>().expect("body should be JSON");
    (status, body)
}

fn field_values(body: &Value, key: &str) -> Vec<String> {
    body.as_array()
        .expect("body should be an array")
        .iter()
        .map(|item| item[key].as_str().unwrap_or_default().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Water levels
// ---------------------------------------------------------------------------

#[test]
fn test_list_water_levels_returns_seed_fleet_in_order() {
    let base = spawn_server(Repository::seeded());
    let (status, body) = get(&base, "/api/water/levels");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        field_values(&body, "stationId"),
        ["HIDRO_001", "HIDRO_002", "HIDRO_003", "HIDRO_004", "HIDRO_005"]
    );
}

#[test]
fn test_station_lookup_and_not_found() {
    let base = spawn_server(Repository::seeded());

    let (status, body) = get(&base, "/api/water/levels/HIDRO_002");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alertStatus"], "CAUTION");
    assert_eq!(body["sourceType"], "RIVER");

    let last_updated = body["lastUpdated"].as_str().expect("lastUpdated should be a string");
    assert_eq!(last_updated.len(), "yyyy-MM-dd HH:mm:ss".len());
    assert_eq!(&last_updated[10..11], " ");

    let (status, body) = get(&base, "/api/water/levels/HIDRO_999");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["id"], "HIDRO_999");
}

#[test]
fn test_water_level_filters() {
    let base = spawn_server(Repository::seeded());

    let (status, body) = get(&base, "/api/water/levels/type/RESERVOIR");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field_values(&body, "stationName"), ["Embalse de Buendía"]);

    let (_, body) = get(&base, "/api/water/levels/alerts/alert");
    assert_eq!(field_values(&body, "stationId"), ["HIDRO_004"]);

    let (status, body) = get(&base, "/api/water/levels/type/lake");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[test]
fn test_invalid_enum_values_are_bad_requests() {
    let base = spawn_server(Repository::seeded());

    for path in [
        "/api/water/levels/type/OCEANO",
        "/api/water/levels/alerts/RED",
        "/api/reservoirs/use/MINING",
        "/api/reservoirs/status/CLOSED",
    ] {
        let (status, body) = get(&base, path);
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected", path);
        assert!(
            body["accepted_values"].as_array().is_some_and(|v| !v.is_empty()),
            "{} should list accepted values",
            path
        );
    }
}

// ---------------------------------------------------------------------------
// 2. Health
// ---------------------------------------------------------------------------

#[test]
fn test_health_ok_for_seed_fleet() {
    let base = spawn_server(Repository::seeded());
    let (status, body) = get(&base, "/api/water/health");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
}

#[test]
fn test_health_unavailable_when_reservoir_out_of_service() {
    let mut fleet = seed::generate();
    fleet.reservoirs[3].status = OperationalStatus::OutOfService;
    let repo = Repository::from_records(fleet.water_levels, fleet.reservoirs).unwrap();

    let base = spawn_server(repo);
    let (status, body) = get(&base, "/api/water/health");

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["emergencyStations"], serde_json::json!([]));
    assert_eq!(body["outOfServiceReservoirs"], serde_json::json!(["EMB_004"]));
}

// ---------------------------------------------------------------------------
// 3. Reservoirs and statistics
// ---------------------------------------------------------------------------

#[test]
fn test_reservoir_routes() {
    let base = spawn_server(Repository::seeded());

    let (status, body) = get(&base, "/api/reservoirs");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(5));

    let (status, body) = get(&base, "/api/reservoirs/EMB_001");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mainRiver"], "Río Ebro");
    assert_eq!(body["fillPercentage"], 63.9);

    let (status, _) = get(&base, "/api/reservoirs/EMB_999");
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&base, "/api/reservoirs/use/hydroelectric");
    assert_eq!(field_values(&body, "reservoirId"), ["EMB_001", "EMB_003"]);

    let (_, body) = get(&base, "/api/reservoirs/status/operational");
    assert_eq!(body.as_array().map(Vec::len), Some(4));
}

#[test]
fn test_statistics_for_seed_fleet() {
    let base = spawn_server(Repository::seeded());
    let (status, body) = get(&base, "/api/reservoirs/statistics");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalStations"], 5);
    assert_eq!(body["totalReservoirs"], 5);
    assert_eq!(body["alertStationCount"], 2);
    let average = body["averageFillPercentage"].as_f64().unwrap();
    assert!((average - 71.3).abs() < 1e-9, "average was {}", average);
}

#[test]
fn test_statistics_for_empty_fleet() {
    let repo = Repository::from_records(Vec::new(), Vec::new()).unwrap();
    let base = spawn_server(repo);
    let (status, body) = get(&base, "/api/reservoirs/statistics");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalReservoirs"], 0);
    assert_eq!(body["averageFillPercentage"], 0.0);
}

// ---------------------------------------------------------------------------
// 4. Transport details
// ---------------------------------------------------------------------------

#[test]
fn test_responses_are_json() {
    let base = spawn_server(Repository::seeded());
    let response = Client::new()
        .get(format!("{}/api/reservoirs", base))
        .send()
        .unwrap();

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "got {}", content_type);
}

#[test]
fn test_unknown_route_and_wrong_method() {
    let base = spawn_server(Repository::seeded());

    let (status, body) = get(&base, "/api/dams");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["available_endpoints"].is_array());

    let response = Client::new()
        .delete(format!("{}/api/reservoirs/EMB_001", base))
        .send()
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn test_concurrent_readers_see_identical_results() {
    let base = spawn_server(Repository::seeded());
    let (_, expected) = get(&base, "/api/water/levels");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let base = base.clone();
            thread::spawn(move || get(&base, "/api/water/levels"))
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.join().expect("reader thread should not panic");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }
}
