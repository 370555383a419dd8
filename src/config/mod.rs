//! Configuration management for kobo-transfer.
//!
//! kobo-transfer reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `KOBO_TRANSFER_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! kf_url = "https://kf.kobotoolbox.org"
//! kc_url = "https://kc.kobotoolbox.org"
//! asset_uid = "aYqBrD4bXgw8hQdWNEt6mG"
//! token = "${KOBO_SOURCE_TOKEN}"
//!
//! [destination]
//! kf_url = "https://kf.eu.kobotoolbox.org"
//! kc_url = "https://kc.eu.kobotoolbox.org"
//! asset_uid = "aFp3hMZ6kPvW9Wt9c2nXrQ"
//! token = "${KOBO_DESTINATION_TOKEN}"
//!
//! [transfer]
//! limit = 5000
//! staging_dir = ".kobo-transfer/media"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kobo_transfer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kobo-transfer.toml")?;
//! println!("Transferring {} -> {}", config.source.asset_uid, config.destination.asset_uid);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DeploymentConfig, LoggingConfig, RetryConfig, TransferConfig,
    TransferSettings,
};
pub use secret::{secret_string, SecretString, SecretValue};
