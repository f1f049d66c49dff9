//! Core configuration, paths, and logging bootstrap for practice-sync.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_LOG_LEVEL, DEFAULT_PROFESSIONALS_TABLE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STATISTICS_TABLE, DEFAULT_SUPABASE_ANON_KEY, DEFAULT_SUPABASE_URL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_for_service, parse_level};
pub use paths::Paths;
