//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SierraExportConfig;
use super::secret::secret_string;
use crate::domain::errors::SierraExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SierraExportConfig
/// 4. Applies environment variable overrides (SIERRA_EXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SierraExportError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use sierra_export::config::loader::load_config;
///
/// let config = load_config("sierra-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SierraExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SierraExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SierraExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`], for configuration already in memory
pub fn load_config_from_str(contents: &str) -> Result<SierraExportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SierraExportConfig = toml::from_str(&contents)
        .map_err(|e| SierraExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SierraExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SierraExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SierraExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parse an override value, naming the variable on failure
fn parse_env<T: FromStr>(name: &str, val: &str) -> Result<T> {
    val.trim().parse().map_err(|_| {
        SierraExportError::Configuration(format!("Invalid value '{val}' for {name}"))
    })
}

/// Applies environment variable overrides using the SIERRA_EXPORT_* prefix
///
/// Variables follow the pattern `SIERRA_EXPORT_<SECTION>_<KEY>`, for example
/// `SIERRA_EXPORT_SIERRA_CLIENT_SECRET` or `SIERRA_EXPORT_EXPORT_CHUNK_COUNT`.
/// Unlike `${VAR}` substitution these apply after parsing, so they can set
/// values the file leaves at their defaults.
fn apply_env_overrides(config: &mut SierraExportConfig) -> Result<()> {
    let var = |key: &str| std::env::var(format!("SIERRA_EXPORT_{key}")).ok();

    // Application overrides
    if let Some(val) = var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_env("SIERRA_EXPORT_APPLICATION_DRY_RUN", &val)?;
    }

    // Sierra overrides
    if let Some(val) = var("SIERRA_API_ROOT_URL") {
        config.sierra.api_root_url = val;
    }
    if let Some(val) = var("SIERRA_CLIENT_KEY") {
        config.sierra.client_key = val;
    }
    if let Some(val) = var("SIERRA_CLIENT_SECRET") {
        config.sierra.client_secret = secret_string(val);
    }
    if let Some(val) = var("SIERRA_CONNECT_TIMEOUT_SECONDS") {
        config.sierra.connect_timeout_seconds =
            parse_env("SIERRA_EXPORT_SIERRA_CONNECT_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("SIERRA_TOKEN_TIMEOUT_SECONDS") {
        config.sierra.token_timeout_seconds =
            parse_env("SIERRA_EXPORT_SIERRA_TOKEN_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("SIERRA_REQUEST_TIMEOUT_SECONDS") {
        config.sierra.request_timeout_seconds =
            parse_env("SIERRA_EXPORT_SIERRA_REQUEST_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("SIERRA_DOWNLOAD_TIMEOUT_SECONDS") {
        config.sierra.download_timeout_seconds =
            parse_env("SIERRA_EXPORT_SIERRA_DOWNLOAD_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("SIERRA_TLS_VERIFY") {
        config.sierra.tls_verify = parse_env("SIERRA_EXPORT_SIERRA_TLS_VERIFY", &val)?;
    }

    // Export overrides
    if let Some(val) = var("EXPORT_ID_SPACE_START") {
        config.export.id_space_start = parse_env("SIERRA_EXPORT_EXPORT_ID_SPACE_START", &val)?;
    }
    if let Some(val) = var("EXPORT_ID_SPACE_END") {
        config.export.id_space_end =
            Some(parse_env("SIERRA_EXPORT_EXPORT_ID_SPACE_END", &val)?);
    }
    if let Some(val) = var("EXPORT_CHUNK_COUNT") {
        config.export.chunk_count = parse_env("SIERRA_EXPORT_EXPORT_CHUNK_COUNT", &val)?;
    }
    if let Some(val) = var("EXPORT_DOWNLOAD_DIR") {
        config.export.download_dir = PathBuf::from(val);
    }
    if let Some(val) = var("EXPORT_FILE_PREFIX") {
        config.export.file_prefix = val;
    }
    if let Some(val) = var("EXPORT_REQUEST_SPAN_OVERRIDE") {
        config.export.request_span_override =
            Some(parse_env("SIERRA_EXPORT_EXPORT_REQUEST_SPAN_OVERRIDE", &val)?);
    }
    if let Some(val) = var("EXPORT_LATEST_LOOKBACK_DAYS") {
        config.export.latest_lookback_days =
            parse_env("SIERRA_EXPORT_EXPORT_LATEST_LOOKBACK_DAYS", &val)?;
    }

    // State overrides
    if let Some(val) = var("STATE_TRACKER_PATH") {
        config.state.tracker_path = PathBuf::from(val);
    }
    if let Some(val) = var("STATE_LOCK_STALE_AFTER_SECONDS") {
        config.state.lock_stale_after_seconds =
            parse_env("SIERRA_EXPORT_STATE_LOCK_STALE_AFTER_SECONDS", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("SIERRA_EXPORT_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SIERRA_LOADER_TEST_VAR", "test_value");
        let input = "client_secret = \"${SIERRA_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "client_secret = \"test_value\"\n");
        std::env::remove_var("SIERRA_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SIERRA_LOADER_MISSING_VAR");
        let input = "client_secret = \"${SIERRA_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SIERRA_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("SIERRA_LOADER_COMMENTED_VAR");
        let input = "# client_secret = \"${SIERRA_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        let err = parse_env::<usize>("SIERRA_EXPORT_EXPORT_CHUNK_COUNT", "many").unwrap_err();
        assert!(matches!(err, SierraExportError::Configuration(_)));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-sierra-export.toml");
        assert!(matches!(result, Err(SierraExportError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[sierra]
api_root_url = "https://catalog.example.edu/iii/sierra-api/v6/"
client_key = "key"
client_secret = "secret"

[export]
chunk_count = 250
download_dir = "/srv/marc"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.export.chunk_count, 250);
        assert_eq!(config.export.id_space_start, 1_000_000);
        assert_eq!(config.export.file_prefix, "sierra_export");
        assert_eq!(config.state.tracker_path, PathBuf::from("tracker.json"));
        assert_eq!(config.sierra.request_timeout_seconds, 30);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let toml_content = r#"
[sierra]
api_root_url = "https://catalog.example.edu/iii/sierra-api/v6/"
client_key = "key"
client_secret = "secret"

[export]
chunk_count = 0
download_dir = "/srv/marc"
"#;
        let err = load_config_from_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("chunk_count"));
        assert_eq!(err.exit_code(), crate::domain::errors::EXIT_CONFIG);
    }
}
