//! Configuration management for sierra-export.
//!
//! TOML configuration with `${VAR_NAME}` substitution, defaults for every
//! optional setting, `SIERRA_EXPORT_<SECTION>_<KEY>` environment overrides,
//! and validation on load.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`SierraConfig`] - API root, credentials, timeouts
//! - [`ExportConfig`] - ID space, chunk count, output directory
//! - [`StateConfig`] - tracker path and lock staleness
//! - [`LoggingConfig`] - local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [sierra]
//! api_root_url = "https://catalog.example.edu/iii/sierra-api/v6/"
//! client_key = "my-client-key"
//! client_secret = "${SIERRA_CLIENT_SECRET}"
//!
//! [export]
//! chunk_count = 250
//! download_dir = "/srv/marc"
//!
//! [state]
//! tracker_path = "/srv/marc/tracker.json"
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use sierra_export::config::load_config;
//!
//! # fn example() {
//! match load_config("sierra-export.toml") {
//!     Ok(config) => println!("Exporting in {} batches", config.export.chunk_count),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, ExportConfig, LoggingConfig, SierraConfig, SierraExportConfig, StateConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
