//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "kobo-transfer.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing kobo-transfer configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your source and destination projects", self.output);
                println!("  2. Create a .env file with your API tokens:");
                println!("     - KOBO_SOURCE_TOKEN");
                println!("     - KOBO_DESTINATION_TOKEN");
                println!("  3. Validate configuration: kobo-transfer validate-config");
                println!("  4. Run the transfer: kobo-transfer transfer");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# kobo-transfer configuration

[source]
kf_url = "https://kf.kobotoolbox.org"
kc_url = "https://kc.kobotoolbox.org"
asset_uid = "aSourceAssetUid"
token = "${KOBO_SOURCE_TOKEN}"

[destination]
kf_url = "https://kf.eu.kobotoolbox.org"
kc_url = "https://kc.eu.kobotoolbox.org"
asset_uid = "aDestinationAssetUid"
token = "${KOBO_DESTINATION_TOKEN}"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# kobo-transfer configuration
#
# Copies submissions and attachments from one KoboToolbox project to another
# project with an identical form. Both projects must be deployed.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Source project (submissions are read from here)
# ============================================================================
[source]
# Form builder (KPI) URL
kf_url = "https://kf.kobotoolbox.org"

# Data collection server (KoboCAT) URL
kc_url = "https://kc.kobotoolbox.org"

# Asset uid, as shown in the project URL
asset_uid = "aSourceAssetUid"

# API token (use environment variable)
token = "${KOBO_SOURCE_TOKEN}"

# ============================================================================
# Destination project (submissions are written here)
# ============================================================================
[destination]
kf_url = "https://kf.eu.kobotoolbox.org"
kc_url = "https://kc.eu.kobotoolbox.org"
asset_uid = "aDestinationAssetUid"
token = "${KOBO_DESTINATION_TOKEN}"

# ============================================================================
# Transfer Settings
# ============================================================================
[transfer]
# Submissions per page (1-30000)
limit = 30000

# HTTP timeout in seconds
timeout_seconds = 120

# Where attachments are downloaded before upload
staging_dir = ".kobo-transfer/media"

# Failed instance ids of the last run (used by --last-failed)
failures_file = ".kobo-transfer/last_failed.txt"

# Keep staged attachments after the run
keep_media = false

# Retry policy for read requests (uploads are never retried)
[transfer.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
