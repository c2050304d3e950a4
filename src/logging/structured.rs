//! Subscriber setup
//!
//! Human-readable lines go to stderr so stdout stays free for command
//! output. With `[logging] local_enabled` every event is also written as one
//! JSON object per line to `sierra-export.log` under `local_path`, rotated
//! according to `local_rotation`.

use crate::config::LoggingConfig;
use crate::domain::{Result, SierraExportError};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "sierra-export.log";

/// Flushes the JSON log file when dropped
///
/// `main` drops it explicitly before `process::exit`.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, takes precedence over `level`.
///
/// # Errors
///
/// `SierraExportError::Configuration` for an unknown level, an uncreatable
/// log directory, or a subscriber that is already installed.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("sierra_export={level}")))
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file, file_guard) = if config.local_enabled {
        let (writer, guard) = json_file_writer(config)?;
        let layer = fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(writer)
            .with_filter(filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| SierraExportError::Configuration(format!("Failed to install logger: {e}")))?;

    tracing::debug!(
        level = %level,
        file_logging = config.local_enabled,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn json_file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = Path::new(&config.local_path);
    std::fs::create_dir_all(dir).map_err(|e| {
        SierraExportError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            dir.display()
        ))
    })?;

    let appender = RollingFileAppender::new(parse_rotation(&config.local_rotation), dir, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(appender))
}

/// `daily` is the fallback; validation rejects anything else up front
fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    let parsed = match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            return Err(SierraExportError::Configuration(format!(
                "Invalid log level '{level}' (expected trace, debug, info, warn or error)"
            )))
        }
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("never"), Rotation::NEVER);
        assert_eq!(parse_rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_json_file_writer_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            local_enabled: true,
            local_path: dir.path().join("logs").display().to_string(),
            local_rotation: "never".to_string(),
        };
        let _writer = json_file_writer(&config).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_bad_level_rejected_before_subscriber_install() {
        let result = init_logging("loud", &LoggingConfig::console_only());
        assert!(matches!(result, Err(SierraExportError::Configuration(_))));
    }
}
