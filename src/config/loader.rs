//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TransferConfig;
use super::secret::secret_string;
use crate::domain::errors::TransferError;
use crate::domain::ids::AssetUid;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Prefix of the environment variables that override configuration values
pub const ENV_PREFIX: &str = "KOBO_TRANSFER";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TransferConfig
/// 4. Applies environment variable overrides (KOBO_TRANSFER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment variable is
/// not set, the TOML is invalid or validation fails.
///
/// # Examples
///
/// ```no_run
/// use kobo_transfer::config::loader::load_config;
///
/// let config = load_config("kobo-transfer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TransferConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TransferError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TransferError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TransferConfig = toml::from_str(&contents)
        .map_err(|e| TransferError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TransferError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap_or_else(|e| panic!("invalid pattern: {e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
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
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
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
        return Err(TransferError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

/// Applies environment variable overrides using the KOBO_TRANSFER_* prefix
///
/// Variables follow the pattern `KOBO_TRANSFER_<SECTION>_<KEY>`, for example
/// `KOBO_TRANSFER_DESTINATION_TOKEN` or `KOBO_TRANSFER_TRANSFER_LIMIT`.
fn apply_env_overrides(config: &mut TransferConfig) -> Result<()> {
    if let Some(val) = env_override("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    for (section, deployment) in [
        ("SOURCE", &mut config.source),
        ("DESTINATION", &mut config.destination),
    ] {
        if let Some(val) = env_override(&format!("{section}_KF_URL")) {
            deployment.kf_url = val;
        }
        if let Some(val) = env_override(&format!("{section}_KC_URL")) {
            deployment.kc_url = val;
        }
        if let Some(val) = env_override(&format!("{section}_ASSET_UID")) {
            deployment.asset_uid = AssetUid::new(val).map_err(TransferError::Configuration)?;
        }
        if let Some(val) = env_override(&format!("{section}_TOKEN")) {
            deployment.token = secret_string(val);
        }
    }

    if let Some(val) = env_override("TRANSFER_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.transfer.limit = limit;
        }
    }
    if let Some(val) = env_override("TRANSFER_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.transfer.timeout_seconds = timeout;
        }
    }
    if let Some(val) = env_override("TRANSFER_STAGING_DIR") {
        config.transfer.staging_dir = PathBuf::from(val);
    }
    if let Some(val) = env_override("TRANSFER_FAILURES_FILE") {
        config.transfer.failures_file = PathBuf::from(val);
    }
    if let Some(val) = env_override("TRANSFER_KEEP_MEDIA") {
        config.transfer.keep_media = val.parse().unwrap_or(false);
    }

    if let Some(val) = env_override("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = env_override("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
