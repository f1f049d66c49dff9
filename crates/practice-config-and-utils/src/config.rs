//! Configuration management for the sync engine.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default Supabase URL (can be overridden at compile time via PRACTICE_SYNC_SUPABASE_URL).
pub const DEFAULT_SUPABASE_URL: &str = match option_env!("PRACTICE_SYNC_SUPABASE_URL") {
    Some(url) => url,
    None => "https://practice-sync.supabase.co",
};

/// Default Supabase anon key
/// (can be overridden at compile time via PRACTICE_SYNC_SUPABASE_ANON_KEY).
pub const DEFAULT_SUPABASE_ANON_KEY: &str = match option_env!("PRACTICE_SYNC_SUPABASE_ANON_KEY") {
    Some(key) => key,
    None => "public-anon-key",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Remote table holding supervising professionals.
pub const DEFAULT_PROFESSIONALS_TABLE: &str = "professionals";

/// Remote table receiving one row per delivered result.
pub const DEFAULT_STATISTICS_TABLE: &str = "client_statistics";

/// Per-request timeout for remote calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Runtime override for the log level.
const LOG_LEVEL_ENV: &str = "PRACTICE_SYNC_LOG_LEVEL";

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Supabase project URL.
    #[serde(default = "default_supabase_url")]
    pub supabase_url: String,
    /// Supabase anon API key (public, safe to ship in the app).
    #[serde(default = "default_supabase_anon_key")]
    pub supabase_anon_key: String,
    /// Table used for professional existence checks.
    #[serde(default = "default_professionals_table")]
    pub professionals_table: String,
    /// Table receiving client statistics rows.
    #[serde(default = "default_statistics_table")]
    pub statistics_table: String,
    /// Timeout applied to every remote request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_supabase_url() -> String {
    DEFAULT_SUPABASE_URL.to_string()
}

fn default_supabase_anon_key() -> String {
    DEFAULT_SUPABASE_ANON_KEY.to_string()
}

fn default_professionals_table() -> String {
    DEFAULT_PROFESSIONALS_TABLE.to_string()
}

fn default_statistics_table() -> String {
    DEFAULT_STATISTICS_TABLE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            supabase_url: default_supabase_url(),
            supabase_anon_key: default_supabase_anon_key(),
            professionals_table: default_professionals_table(),
            statistics_table: default_statistics_table(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    ///
    /// The Supabase URL and anon key are compile-time only and always use the
    /// built-in defaults, regardless of what the config file says.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.supabase_url = default_supabase_url();
        config.supabase_anon_key = default_supabase_anon_key();

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Only the log level can be overridden at runtime.
    fn load_from_env(&mut self) {
        self.apply_log_level_override(std::env::var(LOG_LEVEL_ENV).ok());
    }

    fn apply_log_level_override(&mut self, level: Option<String>) {
        if let Some(level) = level.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()) {
            self.log_level = level;
        }
    }

    /// Reject values that would make every remote call fail.
    pub fn validate(&self) -> CoreResult<()> {
        self.supabase_url()?;
        if self.professionals_table.trim().is_empty() || self.statistics_table.trim().is_empty() {
            return Err(CoreError::Config("remote table names must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Get the Supabase URL as a parsed URL.
    pub fn supabase_url(&self) -> CoreResult<Url> {
        Url::parse(&self.supabase_url).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.supabase_url, DEFAULT_SUPABASE_URL);
        assert_eq!(config.supabase_anon_key, DEFAULT_SUPABASE_ANON_KEY);
        assert_eq!(config.professionals_table, "professionals");
        assert_eq!(config.statistics_table, "client_statistics");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(&config_path, r#"{ "log_level": "debug" }"#).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.statistics_table, DEFAULT_STATISTICS_TABLE);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            log_level: "trace".to_string(),
            statistics_table: "client_statistics_v2".to_string(),
            ..Config::default()
        };
        config.save(&paths).unwrap();

        let loaded = Config::load(&paths).unwrap();
        assert_eq!(loaded.statistics_table, "client_statistics_v2");
    }

    #[test]
    fn test_config_load_forces_compile_time_supabase_values() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        paths.ensure_dirs().unwrap();
        std::fs::write(
            paths.config_file(),
            r#"{ "log_level": "info", "supabase_url": "https://evil.example.com" }"#,
        )
        .unwrap();

        let loaded = Config::load(&paths).unwrap();
        assert_eq!(loaded.supabase_url, DEFAULT_SUPABASE_URL);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.supabase_url, DEFAULT_SUPABASE_URL);
        assert_eq!(config.professionals_table, DEFAULT_PROFESSIONALS_TABLE);
    }

    #[test]
    fn test_log_level_override() {
        let mut config = Config::default();

        config.apply_log_level_override(Some("  ".to_string()));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);

        config.apply_log_level_override(Some("debug".to_string()));
        assert_eq!(config.log_level, "debug");

        config.apply_log_level_override(None);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_config_supabase_url_parse() {
        let config = Config::default();
        let url = config.supabase_url().unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_config_invalid_url() {
        let config = Config {
            supabase_url: "not a valid url".to_string(),
            ..Config::default()
        };

        assert!(config.supabase_url().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_empty_tables() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = Config {
            professionals_table: " ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
