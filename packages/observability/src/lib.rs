//! # Observability
//!
//! Structured logging for the practice-sync workspace.
//!
//! Library crates only produce events through `tracing` macros. The host
//! installs the subscriber once at startup, normally through
//! `practice_config_and_utils::init_logging`. Every event becomes one JSON
//! object per line in `~/.practice-sync/logs/dev.jsonl` (or the configured
//! path), which can be followed with `tail -f ... | jq`.
//!
//! ```rust,ignore
//! let path = observability::init_with_config(observability::LogConfig {
//!     service_name: "practice-sync".into(),
//!     default_level: "debug".into(),
//!     ..Default::default()
//! })?;
//! tracing::info!(log = %path.display(), "ready");
//! ```

mod json_layer;
mod sink;

use std::path::PathBuf;
use thiserror::Error;

pub use json_layer::{JsonLayer, LogEntry};
pub use sink::LogFile;

/// Logging setup options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written into every line as `service`.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset.
    pub default_level: String,
    /// Log file; `~/.practice-sync/logs/dev.jsonl` when `None`.
    pub log_path: Option<PathBuf>,
    /// Echo events to stderr as well.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "practice-sync".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("cannot open log file {path:?}: {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber was installed earlier.
    #[error("subscriber already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Install logging for `service_name` with default options.
pub fn init(service_name: &str) -> Result<PathBuf, InitError> {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Install logging and return the log file path in use.
pub fn init_with_config(config: LogConfig) -> Result<PathBuf, InitError> {
    sink::install(&config)
}
