//! Configuration schema types
//!
//! This module defines the configuration structure for kobo-transfer.

use crate::config::SecretString;
use crate::domain::ids::AssetUid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest page size the KoboToolbox data endpoints accept
pub const MAX_PAGE_LIMIT: usize = 30000;

/// Main kobo-transfer configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Deployment submissions are read from
    pub source: DeploymentConfig,

    /// Deployment submissions are written to
    pub destination: DeploymentConfig,

    /// Transfer settings
    #[serde(default)]
    pub transfer: TransferSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TransferConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate("source")?;
        self.destination.validate("destination")?;

        if self.source.kf_url.trim_end_matches('/') == self.destination.kf_url.trim_end_matches('/')
            && self.source.asset_uid == self.destination.asset_uid
        {
            return Err(
                "source and destination refer to the same asset on the same server".to_string(),
            );
        }

        self.transfer.validate()?;
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
        }
    }
}

/// One KoboToolbox deployment (source or destination)
///
/// KoboToolbox splits its API between the form builder (`kf_url`, KPI) and the
/// data collection server (`kc_url`, KoboCAT).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Base URL of the form builder (KPI), e.g. `https://kf.kobotoolbox.org`
    pub kf_url: String,

    /// Base URL of the data collection server (KoboCAT), e.g. `https://kc.kobotoolbox.org`
    pub kc_url: String,

    /// Asset uid of the project
    pub asset_uid: AssetUid,

    /// API token
    /// Stored securely in memory and automatically zeroized on drop
    pub token: SecretString,
}

impl DeploymentConfig {
    fn validate(&self, section: &str) -> Result<(), String> {
        use secrecy::ExposeSecret;

        for (key, url) in [("kf_url", &self.kf_url), ("kc_url", &self.kc_url)] {
            if url.is_empty() {
                return Err(format!("{section}.{key} cannot be empty"));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{section}.{key} must start with http:// or https://"));
            }
        }

        AssetUid::new(self.asset_uid.as_str()).map_err(|e| format!("{section}.asset_uid: {e}"))?;

        if self.token.expose_secret().is_empty() {
            return Err(format!("{section}.token cannot be empty"));
        }

        Ok(())
    }

    /// XML listing of the asset's submissions
    pub fn data_xml_url(&self) -> String {
        format!(
            "{}/api/v2/assets/{}/data.xml",
            self.kf_url.trim_end_matches('/'),
            self.asset_uid
        )
    }

    /// JSON listing of the asset's submissions (carries attachment metadata)
    pub fn data_json_url(&self) -> String {
        format!(
            "{}/api/v2/assets/{}/data/",
            self.kf_url.trim_end_matches('/'),
            self.asset_uid
        )
    }

    /// Asset detail (includes deployed versions)
    pub fn asset_url(&self) -> String {
        format!(
            "{}/api/v2/assets/{}/",
            self.kf_url.trim_end_matches('/'),
            self.asset_uid
        )
    }

    /// Form listing on the data collection server
    pub fn forms_url(&self) -> String {
        format!("{}/api/v1/forms", self.kc_url.trim_end_matches('/'))
    }

    /// Submission ingestion endpoint
    pub fn submission_url(&self) -> String {
        format!("{}/api/v1/submissions.xml", self.kc_url.trim_end_matches('/'))
    }
}

/// Retry configuration for read requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "transfer.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "transfer.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Transfer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Number of submissions per page
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Directory attachments are staged in before upload
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// File the failed instance ids of the last run are written to
    #[serde(default = "default_failures_file")]
    pub failures_file: PathBuf,

    /// Keep staged attachments after the run
    #[serde(default)]
    pub keep_media: bool,

    /// Retry configuration for read requests
    #[serde(default)]
    pub retry: RetryConfig,
}

impl TransferSettings {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_PAGE_LIMIT).contains(&self.limit) {
            return Err(format!(
                "transfer.limit must be between 1 and {MAX_PAGE_LIMIT}, got {}",
                self.limit
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("transfer.timeout_seconds must be > 0".to_string());
        }

        if self.staging_dir.as_os_str().is_empty() {
            return Err("transfer.staging_dir cannot be empty".to_string());
        }

        if self.failures_file.as_os_str().is_empty() {
            return Err("transfer.failures_file cannot be empty".to_string());
        }

        self.retry.validate()
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            timeout_seconds: default_timeout_seconds(),
            staging_dir: default_staging_dir(),
            failures_file: default_failures_file(),
            keep_media: false,
            retry: RetryConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
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

fn default_limit() -> usize {
    MAX_PAGE_LIMIT
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(".kobo-transfer/media")
}

fn default_failures_file() -> PathBuf {
    PathBuf::from(".kobo-transfer/last_failed.txt")
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn deployment(kf_url: &str, asset_uid: &str) -> DeploymentConfig {
        DeploymentConfig {
            kf_url: kf_url.to_string(),
            kc_url: "https://kc.example.org".to_string(),
            asset_uid: AssetUid::new(asset_uid).unwrap(),
            token: secret_string("token".to_string()),
        }
    }

    fn config() -> TransferConfig {
        TransferConfig {
            application: ApplicationConfig::default(),
            source: deployment("https://kf.old.example.org", "aSrc"),
            destination: deployment("https://kf.example.org", "aDest"),
            transfer: TransferSettings::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = config();
        config.source.kc_url = "kc.example.org".to_string();
        assert_eq!(
            config.validate().unwrap_err(),
            "source.kc_url must start with http:// or https://"
        );
    }

    #[test]
    fn test_empty_token() {
        let mut config = config();
        config.destination.token = secret_string(String::new());
        assert_eq!(
            config.validate().unwrap_err(),
            "destination.token cannot be empty"
        );
    }

    #[test]
    fn test_same_asset_rejected() {
        let mut config = config();
        config.destination = deployment("https://kf.old.example.org/", "aSrc");
        assert!(config.validate().unwrap_err().contains("same asset"));
    }

    #[test]
    fn test_same_server_different_asset_allowed() {
        let mut config = config();
        config.destination = deployment("https://kf.old.example.org", "aDest");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_limit_bounds() {
        let mut config = config();
        config.transfer.limit = 0;
        assert!(config.validate().is_err());
        config.transfer.limit = MAX_PAGE_LIMIT + 1;
        assert!(config.validate().is_err());
        config.transfer.limit = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_bounds() {
        let mut config = config();
        config.transfer.retry.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_urls() {
        let deployment = deployment("https://kf.example.org/", "aDest");
        assert_eq!(
            deployment.data_xml_url(),
            "https://kf.example.org/api/v2/assets/aDest/data.xml"
        );
        assert_eq!(
            deployment.data_json_url(),
            "https://kf.example.org/api/v2/assets/aDest/data/"
        );
        assert_eq!(
            deployment.asset_url(),
            "https://kf.example.org/api/v2/assets/aDest/"
        );
        assert_eq!(deployment.forms_url(), "https://kc.example.org/api/v1/forms");
        assert_eq!(
            deployment.submission_url(),
            "https://kc.example.org/api/v1/submissions.xml"
        );
    }
}
