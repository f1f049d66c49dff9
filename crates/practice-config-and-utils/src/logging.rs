//! Logging initialization.
//!
//! Thin mapping from practice-sync settings onto the observability crate.
//! Every component writes structured JSONL to `~/.practice-sync/logs/dev.jsonl`
//! unless the host passes its own log file.

use crate::CoreResult;
use std::path::PathBuf;

/// Service name used when the host does not pick one.
const DEFAULT_SERVICE_NAME: &str = "practice-sync";

/// Initialize the logging system for the sync engine.
///
/// # Arguments
///
/// * `level` - Default log level (trace, debug, info, warn, error)
///
/// # Example
///
/// ```ignore
/// init_logging("info")?;
/// tracing::info!("sync engine ready");
/// ```
pub fn init_logging(level: &str) -> CoreResult<PathBuf> {
    init_logging_for_service(DEFAULT_SERVICE_NAME, level, None)
}

/// Initialize logging with a custom service name and optional log file.
///
/// `log_path` is typically `Paths::log_file()` when the host relocates the
/// base directory. Returns the log file in use.
pub fn init_logging_for_service(
    service_name: &str,
    level: &str,
    log_path: Option<PathBuf>,
) -> CoreResult<PathBuf> {
    Ok(observability::init_with_config(log_config(
        service_name,
        level,
        log_path,
    ))?)
}

fn log_config(
    service_name: &str,
    level: &str,
    log_path: Option<PathBuf>,
) -> observability::LogConfig {
    observability::LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).to_string().to_lowercase(),
        log_path,
        also_stderr: cfg!(debug_assertions),
    }
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
