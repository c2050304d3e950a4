//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// sierra-export - resumable Sierra MARC batch exporter
#[derive(Parser, Debug)]
#[command(name = "sierra-export")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sierra-export.toml", env = "SIERRA_EXPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SIERRA_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the next pending batch
    Export(commands::export::ExportArgs),

    /// Show tracker progress
    Status(commands::status::StatusArgs),

    /// Recompute checksums of downloaded artifacts
    Verify(commands::verify::VerifyArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Write a sample configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["sierra-export", "export"]);
        assert_eq!(cli.config, "sierra-export.toml");
        assert!(matches!(cli.command, Commands::Export(ref a) if !a.dry_run));
    }

    #[test]
    fn test_cli_parse_export_dry_run() {
        let cli = Cli::parse_from(["sierra-export", "export", "--dry-run"]);
        assert!(matches!(cli.command, Commands::Export(ref a) if a.dry_run));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["sierra-export", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["sierra-export", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_status_all() {
        let cli = Cli::parse_from(["sierra-export", "status", "--all"]);
        assert!(matches!(cli.command, Commands::Status(ref a) if a.all));
    }

    #[test]
    fn test_cli_parse_verify() {
        let cli = Cli::parse_from(["sierra-export", "verify"]);
        assert!(matches!(cli.command, Commands::Verify(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["sierra-export", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["sierra-export", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref a) if a.force));
    }
}
