//! Init command implementation
//!
//! Writes a sample configuration file.

use crate::domain::errors::{EXIT_CONFIG, EXIT_FATAL, EXIT_PROGRESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "sierra-export.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your catalog's API root and paths", self.output);
                println!("  2. Put the client secret in .env as SIERRA_CLIENT_SECRET=...");
                println!("  3. Validate: sierra-export validate-config");
                println!("  4. Preview: sierra-export export --dry-run");
                println!("  5. Schedule: sierra-export export");
                Ok(EXIT_PROGRESS)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Sample configuration with every section
    pub fn sample_config() -> &'static str {
        r#"# sierra-export configuration
#
# Every value can be overridden with SIERRA_EXPORT_<SECTION>_<KEY>,
# e.g. SIERRA_EXPORT_EXPORT_CHUNK_COUNT=500.

[application]
log_level = "info"
dry_run = false

[sierra]
api_root_url = "https://catalog.example.edu/iii/sierra-api/v6/"
client_key = "your-client-key"
client_secret = "${SIERRA_CLIENT_SECRET}"
connect_timeout_seconds = 10
token_timeout_seconds = 20
request_timeout_seconds = 30
download_timeout_seconds = 60
tls_verify = true

[export]
id_space_start = 1000000
# Fixed upper bound; leave unset to resolve it from the API on the first run
# id_space_end = 3500000
chunk_count = 250
download_dir = "./marc"
file_prefix = "sierra_export"
# Ask for only [start, start + n] of each batch (smoke testing)
# request_span_override = 10
latest_lookback_days = 30

[state]
tracker_path = "./tracker.json"
lock_stale_after_seconds = 21600

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SierraExportConfig;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_parses() {
        // ${VAR} substitution is skipped here; parse the raw TOML directly
        let config: SierraExportConfig = toml::from_str(InitArgs::sample_config()).unwrap();
        assert_eq!(config.export.chunk_count, 250);
        assert_eq!(config.export.id_space_start, 1_000_000);
        assert!(config.export.id_space_end.is_none());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("sierra-export.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), EXIT_PROGRESS);
        assert!(fs::read_to_string(&output).unwrap().contains("[sierra]"));
    }
}
