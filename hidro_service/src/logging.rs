/// Structured logging for the hydrological data service
///
/// Leveled, component-tagged log lines with timestamps. Writes to the
/// console and optionally appends to a log file. Logging before
/// `init_logger` is called is a silent no-op, which keeps unit tests quiet.

use chrono::Local;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(rename = "warn", alias = "warning")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Http,
    Repository,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Http => write!(f, "HTTP"),
            Component::Repository => write!(f, "REPO"),
            Component::Config => write!(f, "CFG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to emit
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: &Component, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let entry = format_entry(level, component, subject, message);
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

        let line = if self.console_timestamps {
            format!("{} {}", timestamp, entry)
        } else {
            entry.clone()
        };
        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
            LogLevel::Info | LogLevel::Debug => println!("{}", line),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &format!("{} {}", timestamp, entry)) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// `LEVEL COMPONENT [subject]: message`
fn format_entry(level: LogLevel, component: &Component, subject: Option<&str>, message: &str) -> String {
    let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{:<5} {}{}: {}", level.to_string(), component, subject_part, message)
}

fn emit(level: LogLevel, component: Component, subject: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, subject, message);
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

pub fn info(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, subject, message);
}

pub fn warn(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, subject, message);
}

pub fn error(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, subject, message);
}

pub fn debug(component: Component, subject: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, subject, message);
}

// ---------------------------------------------------------------------------
// Request Logging
// ---------------------------------------------------------------------------

/// Level a finished request is logged at, chosen by its status code.
pub fn request_log_level(status: u16) -> LogLevel {
    match status {
        500 => LogLevel::Error,
        501..=599 => LogLevel::Warning,
        400..=499 => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

/// Log one handled request: `GET /api/reservoirs -> 200 (0.4 ms)`
pub fn log_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let message = format!(
        "{} {} -> {} ({:.1} ms)",
        method,
        path,
        status,
        elapsed.as_secs_f64() * 1000.0
    );
    emit(request_log_level(status), Component::Http, None, &message);
}
