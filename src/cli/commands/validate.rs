//! Validate config command implementation

use crate::config::load_config;
use crate::domain::errors::{EXIT_CONFIG, EXIT_PROGRESS};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Sierra API: {}", config.sierra.api_root_url);
        println!("  Client Key: {}", config.sierra.client_key);
        println!(
            "  Timeouts: connect {}s, token {}s, request {}s, download {}s",
            config.sierra.connect_timeout_seconds,
            config.sierra.token_timeout_seconds,
            config.sierra.request_timeout_seconds,
            config.sierra.download_timeout_seconds
        );
        println!(
            "  ID Space: [{}, {}]",
            config.export.id_space_start,
            config
                .export
                .id_space_end
                .map(|e| e.to_string())
                .unwrap_or_else(|| "resolved from API".to_string())
        );
        println!("  Chunk Count: {}", config.export.chunk_count);
        println!("  Download Dir: {}", config.export.download_dir.display());
        println!("  File Prefix: {}", config.export.file_prefix);
        if let Some(span) = config.export.request_span_override {
            println!("  Request Span Override: {span}");
        }
        println!("  Tracker: {}", config.state.tracker_path.display());
        println!();
        Ok(EXIT_PROGRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/sierra-export.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
