/// HTTP endpoint for querying the hydrological data
///
/// Thin transport adapter over the repository and statistics modules:
/// parses the request path, converts enum path parameters, calls into the
/// core and serializes the result as JSON. All mapping from outcomes to
/// status codes lives in `ApiError::status_code`.
///
/// Endpoints:
/// - GET /api/water/levels
/// - GET /api/water/levels/{stationId}
/// - GET /api/water/levels/type/{type}
/// - GET /api/water/levels/alerts/{alertStatus}
/// - GET /api/water/health
/// - GET /api/reservoirs
/// - GET /api/reservoirs/{id}
/// - GET /api/reservoirs/use/{primaryUse}
/// - GET /api/reservoirs/status/{status}
/// - GET /api/reservoirs/statistics

use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::ServerConfig;
use crate::logging::{self, Component};
use crate::model::{AlertStatus, OperationalStatus, ParseEnumError, PrimaryUse, SourceType};
use crate::repository::Repository;
use crate::statistics;

/// Every route served, as `(method, path template)`.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /api/water/levels",
    "GET /api/water/levels/{stationId}",
    "GET /api/water/levels/type/{type}",
    "GET /api/water/levels/alerts/{alertStatus}",
    "GET /api/water/health",
    "GET /api/reservoirs",
    "GET /api/reservoirs/{id}",
    "GET /api/reservoirs/use/{primaryUse}",
    "GET /api/reservoirs/status/{status}",
    "GET /api/reservoirs/statistics",
];

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A successful (or deliberately non-2xx, e.g. unhealthy) JSON response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Everything a request can fail with.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// A well-formed key matched no record.
    NotFound { resource: &'static str, id: String },
    /// An enum path parameter matched no literal.
    InvalidEnumValue(ParseEnumError),
    /// A path segment was not valid percent-encoded UTF-8.
    MalformedPath(String),
    UnknownRoute(String),
    MethodNotAllowed(String),
    /// Unexpected fault; the detail is logged, never returned.
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } => 404,
            ApiError::InvalidEnumValue(_) => 400,
            ApiError::MalformedPath(_) => 400,
            ApiError::UnknownRoute(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::NotFound { resource, id } => json!({
                "error": self.to_string(),
                "resource": resource,
                "id": id,
            }),
            ApiError::InvalidEnumValue(e) => json!({
                "error": self.to_string(),
                "parameter": e.kind,
                "value": e.input,
                "accepted_values": e.accepted,
            }),
            ApiError::MalformedPath(_) => json!({ "error": self.to_string() }),
            ApiError::UnknownRoute(path) => json!({
                "error": "Not found",
                "path": path,
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
            ApiError::MethodNotAllowed(method) => json!({
                "error": self.to_string(),
                "method": method,
                "allowed": ["GET"],
            }),
            ApiError::Internal(_) => json!({
                "error": "Internal server error",
                "message": "The request could not be completed",
            }),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { resource, id } => write!(f, "{} with id {} not found", resource, id),
            ApiError::InvalidEnumValue(e) => write!(f, "{}", e),
            ApiError::MalformedPath(detail) => write!(f, "Malformed request path: {}", detail),
            ApiError::UnknownRoute(path) => write!(f, "No route for {}", path),
            ApiError::MethodNotAllowed(method) => write!(f, "Method {} not allowed", method),
            ApiError::Internal(detail) => write!(f, "Internal error: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ParseEnumError> for ApiError {
    fn from(e: ParseEnumError) -> Self {
        ApiError::InvalidEnumValue(e)
    }
}

/// Failure to start the listener.
#[derive(Debug)]
pub enum EndpointError {
    Bind { address: String, reason: String },
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::Bind { address, reason } => {
                write!(f, "Failed to start HTTP server on {}: {}", address, reason)
            }
        }
    }
}

impl std::error::Error for EndpointError {}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Dispatches one request against the repository. Pure: no I/O.
pub fn route(repo: &Repository, method: &Method, url: &str) -> Result<ApiResponse, ApiError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();

    if *method != Method::Get {
        return Err(ApiError::MethodNotAllowed(method.to_string()));
    }

    let segments = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode_segment)
        .collect::<Result<Vec<String>, ApiError>>()?;
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match segments.as_slice() {
        ["api", "water", "levels"] => to_json_response(repo.list_water_levels()),
        ["api", "water", "levels", "type", raw] => {
            let source_type: SourceType = raw.parse()?;
            to_json_response(&repo.list_water_levels_by_type(source_type))
        }
        ["api", "water", "levels", "alerts", raw] => {
            let alert_status: AlertStatus = raw.parse()?;
            to_json_response(&repo.list_water_levels_by_alert_status(alert_status))
        }
        ["api", "water", "levels", station_id] => match repo.get_water_level_by_station_id(station_id) {
            Some(station) => to_json_response(station),
            None => Err(ApiError::NotFound {
                resource: "Station",
                id: station_id.to_string(),
            }),
        },
        ["api", "water", "health"] => Ok(health_response(repo)),
        ["api", "reservoirs"] => to_json_response(repo.list_reservoirs()),
        ["api", "reservoirs", "statistics"] => statistics_response(repo),
        ["api", "reservoirs", "use", raw] => {
            let primary_use: PrimaryUse = raw.parse()?;
            to_json_response(&repo.list_reservoirs_by_primary_use(primary_use))
        }
        ["api", "reservoirs", "status", raw] => {
            let status: OperationalStatus = raw.parse()?;
            to_json_response(&repo.list_reservoirs_by_status(status))
        }
        ["api", "reservoirs", reservoir_id] => match repo.get_reservoir_by_id(reservoir_id) {
            Some(reservoir) => to_json_response(reservoir),
            None => Err(ApiError::NotFound {
                resource: "Reservoir",
                id: reservoir_id.to_string(),
            }),
        },
        _ => Err(ApiError::UnknownRoute(path.to_string())),
    }
}

fn decode_segment(segment: &str) -> Result<String, ApiError> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ApiError::MalformedPath(format!("'{}': {}", segment, e)))
}

fn to_json_response<T: Serialize + ?Sized>(value: &T) -> Result<ApiResponse, ApiError> {
    serde_json::to_value(value)
        .map(ApiResponse::ok)
        .map_err(|e| ApiError::Internal(format!("serialization failed: {}", e)))
}

/// 200 when healthy, 503 otherwise.
fn health_response(repo: &Repository) -> ApiResponse {
    let report = statistics::evaluate_health(repo);

    let (status, state, message) = if report.healthy {
        (200, "healthy", "Hydrological system operating normally")
    } else {
        (503, "unhealthy", "Hydrological system has critical alerts")
    };

    ApiResponse {
        status,
        body: json!({
            "status": state,
            "message": message,
            "healthy": report.healthy,
            "emergencyStations": report.emergency_stations,
            "outOfServiceReservoirs": report.out_of_service_reservoirs,
        }),
    }
}

fn statistics_response(repo: &Repository) -> Result<ApiResponse, ApiError> {
    let report = statistics::compute_statistics(repo);
    let mut response = to_json_response(&report)?;
    if let Value::Object(ref mut fields) = response.body {
        fields.insert("summary".to_string(), Value::String(report.to_string()));
    }
    Ok(response)
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Binds the listener without serving yet. Port 0 picks an ephemeral port.
pub fn bind(bind_address: &str, port: u16) -> Result<Server, EndpointError> {
    let address = format!("{}:{}", bind_address, port);
    Server::http(&address).map_err(|e| EndpointError::Bind {
        address,
        reason: e.to_string(),
    })
}

/// The socket address a bound server is listening on.
pub fn local_addr(server: &Server) -> Option<SocketAddr> {
    server.server_addr().to_ip()
}

/// Serves requests until the listener shuts down, dispatching each one onto
/// a pool of `worker_threads` workers sharing the repository.
pub fn serve(server: Server, repo: Arc<Repository>, worker_threads: usize) {
    let pool = ThreadPool::new(worker_threads.max(1));

    for request in server.incoming_requests() {
        let repo = Arc::clone(&repo);
        pool.execute(move || handle_request(&repo, request));
    }

    pool.join();
}

/// Bind and serve with the configured listener settings. Blocks.
pub fn start_endpoint_server(config: &ServerConfig, repo: Arc<Repository>) -> Result<(), EndpointError> {
    let server = bind(&config.bind_address, config.port)?;

    logging::info(
        Component::Http,
        None,
        &format!(
            "Listening on http://{}:{} with {} workers",
            config.bind_address, config.port, config.worker_threads
        ),
    );
    for endpoint in AVAILABLE_ENDPOINTS {
        logging::debug(Component::Http, None, endpoint);
    }

    serve(server, repo, config.worker_threads);
    Ok(())
}

fn handle_request(repo: &Repository, request: Request) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| route(repo, &method, &url)))
        .unwrap_or_else(|_| Err(ApiError::Internal("request handler panicked".to_string())));

    let (status, body) = match outcome {
        Ok(response) => (response.status, response.body),
        Err(e) => {
            if let ApiError::Internal(_) = e {
                logging::error(Component::Http, Some(&url), &e.to_string());
            }
            (e.status_code(), e.to_json())
        }
    };

    logging::log_request(method.as_str(), &url, status, started.elapsed());

    if let Err(e) = request.respond(create_response(status, &body)) {
        logging::warn(Component::Http, Some(&url), &format!("Failed to send response: {}", e));
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &Value) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::from_data(body.into_bytes()).with_status_code(StatusCode::from(status_code));
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json; charset=utf-8"[..]) {
        response = response.with_header(header);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
