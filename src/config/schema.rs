//! Configuration schema definitions
//!
//! Type-safe configuration structs for every section of
//! `sierra-export.toml`, with defaults and validation.

use super::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SierraExportConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Sierra API connection settings
    pub sierra: SierraConfig,

    /// Export planning and output settings
    pub export: ExportConfig,

    /// Tracker location and locking
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SierraExportConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::domain::Result<Self> {
        super::loader::load_config(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.sierra.validate()?;
        self.export.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Report the next batch without calling the range export or writing state
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Sierra API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SierraConfig {
    /// API root, e.g. `https://catalog.example.edu/iii/sierra-api/v6/`
    pub api_root_url: String,

    /// API client key
    pub client_key: String,

    /// API client secret
    /// Stored securely in memory and automatically zeroized on drop
    pub client_secret: SecretString,

    /// TCP connect timeout for every request
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Timeout for the token request
    #[serde(default = "default_token_timeout_seconds")]
    pub token_timeout_seconds: u64,

    /// Timeout for range export and latest-record requests
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Timeout for a whole file download
    #[serde(default = "default_download_timeout_seconds")]
    pub download_timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Only disable against test servers with self-signed certificates.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl SierraConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.api_root_url.is_empty() {
            return Err("sierra.api_root_url cannot be empty".to_string());
        }

        if !self.api_root_url.starts_with("http://") && !self.api_root_url.starts_with("https://")
        {
            return Err("sierra.api_root_url must start with http:// or https://".to_string());
        }

        url::Url::parse(&self.api_root_url)
            .map_err(|e| format!("sierra.api_root_url is not a valid URL: {e}"))?;

        if self.client_key.trim().is_empty() {
            return Err("sierra.client_key cannot be empty".to_string());
        }

        if self.client_secret.expose_secret().is_empty() {
            return Err("sierra.client_secret cannot be empty".to_string());
        }

        for (name, value) in [
            ("connect_timeout_seconds", self.connect_timeout_seconds),
            ("token_timeout_seconds", self.token_timeout_seconds),
            ("request_timeout_seconds", self.request_timeout_seconds),
            ("download_timeout_seconds", self.download_timeout_seconds),
        ] {
            if value == 0 {
                return Err(format!("sierra.{name} must be > 0"));
            }
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Lower bound of the exportable ID space
    #[serde(default = "default_id_space_start")]
    pub id_space_start: u64,

    /// Fixed upper bound; when unset it is resolved from the API once
    #[serde(default)]
    pub id_space_end: Option<u64>,

    /// Number of batches to split the ID space into
    pub chunk_count: usize,

    /// Directory receiving MARC files and empty-range responses
    pub download_dir: PathBuf,

    /// Artifact file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Request only `[start, start + n]` of each batch (smoke testing)
    #[serde(default)]
    pub request_span_override: Option<u64>,

    /// How far back the latest-record query looks
    #[serde(default = "default_latest_lookback_days")]
    pub latest_lookback_days: u32,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_count == 0 {
            return Err("export.chunk_count must be > 0".to_string());
        }

        if let Some(end) = self.id_space_end {
            if end < self.id_space_start {
                return Err(format!(
                    "export.id_space_end ({end}) must be >= export.id_space_start ({})",
                    self.id_space_start
                ));
            }
        }

        if self.download_dir.as_os_str().is_empty() {
            return Err("export.download_dir cannot be empty".to_string());
        }

        if self.file_prefix.is_empty()
            || self
                .file_prefix
                .contains(|c: char| c == '/' || c == '\\' || c.is_whitespace())
        {
            return Err(format!(
                "export.file_prefix '{}' must be non-empty and contain no path separators or spaces",
                self.file_prefix
            ));
        }

        if self.latest_lookback_days == 0 {
            return Err("export.latest_lookback_days must be > 0".to_string());
        }

        Ok(())
    }
}

/// Tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the tracker JSON document
    #[serde(default = "default_tracker_path")]
    pub tracker_path: PathBuf,

    /// Age after which a leftover lock file is considered abandoned
    #[serde(default = "default_lock_stale_after_seconds")]
    pub lock_stale_after_seconds: u64,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tracker_path.as_os_str().is_empty() {
            return Err("state.tracker_path cannot be empty".to_string());
        }
        if self.lock_stale_after_seconds == 0 {
            return Err("state.lock_stale_after_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            tracker_path: default_tracker_path(),
            lock_stale_after_seconds: default_lock_stale_after_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging, used before the configuration is available
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_token_timeout_seconds() -> u64 {
    20
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_download_timeout_seconds() -> u64 {
    60
}

fn default_id_space_start() -> u64 {
    1_000_000
}

fn default_file_prefix() -> String {
    "sierra_export".to_string()
}

fn default_latest_lookback_days() -> u32 {
    30
}

fn default_tracker_path() -> PathBuf {
    PathBuf::from("tracker.json")
}

fn default_lock_stale_after_seconds() -> u64 {
    6 * 60 * 60
}

fn default_local_path() -> String {
    "/var/log/sierra-export".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret::secret_string;

    fn sierra_config() -> SierraConfig {
        SierraConfig {
            api_root_url: "https://catalog.example.edu/iii/sierra-api/v6/".to_string(),
            client_key: "key".to_string(),
            client_secret: secret_string("secret".to_string()),
            connect_timeout_seconds: 10,
            token_timeout_seconds: 20,
            request_timeout_seconds: 30,
            download_timeout_seconds: 60,
            tls_verify: true,
        }
    }

    fn export_config() -> ExportConfig {
        ExportConfig {
            id_space_start: 1_000_000,
            id_space_end: None,
            chunk_count: 100,
            download_dir: PathBuf::from("/srv/marc"),
            file_prefix: "sierra_export".to_string(),
            request_span_override: None,
            latest_lookback_days: 30,
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sierra_config_validation() {
        let mut config = sierra_config();
        assert!(config.validate().is_ok());

        config.api_root_url = "ftp://catalog".to_string();
        assert!(config.validate().is_err());

        config = sierra_config();
        config.client_key = " ".to_string();
        assert!(config.validate().is_err());

        config = sierra_config();
        config.client_secret = secret_string(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = sierra_config();
        config.download_timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("download_timeout_seconds"));
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = export_config();
        assert!(config.validate().is_ok());

        config.chunk_count = 0;
        assert!(config.validate().is_err());

        config = export_config();
        config.id_space_end = Some(999_999);
        assert!(config.validate().is_err());

        config = export_config();
        config.file_prefix = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let config = LoggingConfig {
            local_rotation: "weekly".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeouts_as_durations() {
        let config = sierra_config();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.download_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_id_space_start(), 1_000_000);
        assert_eq!(default_file_prefix(), "sierra_export");
        assert_eq!(default_tracker_path(), PathBuf::from("tracker.json"));
        assert_eq!(default_request_timeout_seconds(), 30);
    }
}
