/// Service configuration loader - parses service.toml
///
/// Keeps bind address, worker count and logging options out of the code.
/// The file is optional: every field has a default, and `HIDRO_*`
/// environment variables (optionally from `.env`) override what the file
/// says.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::logging::LogLevel;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "service.toml";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Size of the request-handling worker pool; must be at least 1.
    pub worker_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            worker_threads: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Append log lines to this file in addition to the console.
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read
    Read { path: String, source: io::Error },
    /// The file is not valid TOML or has wrongly typed fields
    Parse { path: String, source: toml::de::Error },
    /// A value (from the file or the environment) is out of range
    InvalidValue { key: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path, source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path, source)
            }
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str, origin: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Loads configuration from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let origin = path.display().to_string();

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ServiceConfig::default()),
        Err(source) => return Err(ConfigError::Read { path: origin, source }),
    };

    parse_config(&contents, &origin)
}

/// Loads `path`, applies `.env` and process environment overrides, and
/// validates the result. This is what the daemon uses at startup.
pub fn load_service_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    dotenv::dotenv().ok();

    let mut config = load_config(path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

impl ServiceConfig {
    /// Applies `HIDRO_*` overrides obtained through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("HIDRO_BIND_ADDRESS") {
            self.server.bind_address = address;
        }
        if let Some(port) = lookup("HIDRO_PORT") {
            self.server.port = parse_value("HIDRO_PORT", &port)?;
        }
        if let Some(workers) = lookup("HIDRO_WORKER_THREADS") {
            self.server.worker_threads = parse_value("HIDRO_WORKER_THREADS", &workers)?;
        }
        if let Some(level) = lookup("HIDRO_LOG_LEVEL") {
            self.logging.level = level.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "HIDRO_LOG_LEVEL".to_string(),
                value: level.clone(),
                reason,
            })?;
        }
        if let Some(file) = lookup("HIDRO_LOG_FILE") {
            self.logging.file = if file.trim().is_empty() { None } else { Some(file) };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.worker_threads".to_string(),
                value: "0".to_string(),
                reason: "at least one worker thread is required".to_string(),
            });
        }
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "server.bind_address".to_string(),
                value: self.server.bind_address.clone(),
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// `address:port` string handed to the HTTP listener.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
