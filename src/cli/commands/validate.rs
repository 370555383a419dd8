//! Validate config command implementation
//!
//! Loads and validates the configuration file without contacting either server.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Source: {} ({})",
            config.source.asset_uid, config.source.kf_url
        );
        println!(
            "  Destination: {} ({})",
            config.destination.asset_uid, config.destination.kf_url
        );
        println!("  Page Size: {}", config.transfer.limit);
        println!("  Staging Directory: {}", config.transfer.staging_dir.display());
        println!("  Failures File: {}", config.transfer.failures_file.display());
        println!("  Keep Media: {}", config.transfer.keep_media);
        println!();
        Ok(0)
    }
}
