//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use kobo_transfer::config::load_config;
use kobo_transfer::domain::TransferError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("KOBO_TRANSFER_APPLICATION_LOG_LEVEL");
    std::env::remove_var("KOBO_TRANSFER_DESTINATION_TOKEN");
    std::env::remove_var("KOBO_TRANSFER_DESTINATION_ASSET_UID");
    std::env::remove_var("KOBO_TRANSFER_TRANSFER_LIMIT");
    std::env::remove_var("KOBO_TRANSFER_TRANSFER_KEEP_MEDIA");
    std::env::remove_var("TEST_KOBO_SOURCE_TOKEN");
    std::env::remove_var("TEST_KOBO_DEST_TOKEN");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

const MINIMAL: &str = r#"
[source]
kf_url = "https://kf.old.example.org"
kc_url = "https://kc.old.example.org"
asset_uid = "aSrcAsset"
token = "source-token"

[destination]
kf_url = "https://kf.example.org"
kc_url = "https://kc.example.org"
asset_uid = "aDestAsset"
token = "dest-token"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[application]
log_level = "debug"

[source]
kf_url = "https://kf.old.example.org/"
kc_url = "https://kc.old.example.org"
asset_uid = "aSrcAsset"
token = "source-token"

[destination]
kf_url = "https://kf.example.org"
kc_url = "https://kc.example.org"
asset_uid = "aDestAsset"
token = "dest-token"

[transfer]
limit = 500
timeout_seconds = 30
staging_dir = "/tmp/kobo/media"
failures_file = "/tmp/kobo/failed.txt"
keep_media = true

[transfer.retry]
max_retries = 5
initial_delay_ms = 200
max_delay_ms = 5000
backoff_multiplier = 1.5

[logging]
local_enabled = true
local_path = "/tmp/kobo/logs"
local_rotation = "hourly"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");

    assert_eq!(config.source.asset_uid.as_str(), "aSrcAsset");
    assert_eq!(config.source.token.expose_secret(), "source-token");
    assert_eq!(
        config.source.data_xml_url(),
        "https://kf.old.example.org/api/v2/assets/aSrcAsset/data.xml"
    );
    assert_eq!(
        config.destination.submission_url(),
        "https://kc.example.org/api/v1/submissions.xml"
    );

    assert_eq!(config.transfer.limit, 500);
    assert_eq!(config.transfer.timeout_seconds, 30);
    assert_eq!(config.transfer.staging_dir, PathBuf::from("/tmp/kobo/media"));
    assert_eq!(config.transfer.failures_file, PathBuf::from("/tmp/kobo/failed.txt"));
    assert!(config.transfer.keep_media);
    assert_eq!(config.transfer.retry.max_retries, 5);
    assert_eq!(config.transfer.retry.backoff_multiplier, 1.5);

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/tmp/kobo/logs");
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(MINIMAL);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.transfer.limit, 30000);
    assert_eq!(config.transfer.timeout_seconds, 120);
    assert!(!config.transfer.keep_media);
    assert_eq!(config.transfer.retry.max_retries, 3);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "daily");
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_KOBO_SOURCE_TOKEN", "secret-source");
    std::env::set_var("TEST_KOBO_DEST_TOKEN", "secret-dest");

    let toml_content = MINIMAL
        .replace("\"source-token\"", "\"${TEST_KOBO_SOURCE_TOKEN}\"")
        .replace("\"dest-token\"", "\"${TEST_KOBO_DEST_TOKEN}\"");
    let temp_file = write_config(&toml_content);

    let config = load_config(temp_file.path()).expect("Failed to load config");
    assert_eq!(config.source.token.expose_secret(), "secret-source");
    assert_eq!(config.destination.token.expose_secret(), "secret-dest");

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = MINIMAL.replace("\"dest-token\"", "\"${TEST_KOBO_DEST_TOKEN}\"");
    let temp_file = write_config(&toml_content);

    let err = load_config(temp_file.path()).unwrap_err();
    assert!(matches!(err, TransferError::Configuration(_)));
    assert!(err.to_string().contains("TEST_KOBO_DEST_TOKEN"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("KOBO_TRANSFER_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("KOBO_TRANSFER_DESTINATION_TOKEN", "override-token");
    std::env::set_var("KOBO_TRANSFER_DESTINATION_ASSET_UID", "aOtherAsset");
    std::env::set_var("KOBO_TRANSFER_TRANSFER_LIMIT", "250");
    std::env::set_var("KOBO_TRANSFER_TRANSFER_KEEP_MEDIA", "true");

    let temp_file = write_config(MINIMAL);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.destination.token.expose_secret(), "override-token");
    assert_eq!(config.destination.asset_uid.as_str(), "aOtherAsset");
    assert_eq!(config.transfer.limit, 250);
    assert!(config.transfer.keep_media);

    cleanup_env_vars();
}

#[test]
fn test_env_override_is_validated() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("KOBO_TRANSFER_TRANSFER_LIMIT", "50000");

    let temp_file = write_config(MINIMAL);
    let result = load_config(temp_file.path());

    cleanup_env_vars();
    assert!(result.is_err());
}

#[test]
fn test_same_source_and_destination_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = MINIMAL
        .replace("https://kf.example.org", "https://kf.old.example.org/")
        .replace("aDestAsset", "aSrcAsset");
    let temp_file = write_config(&toml_content);

    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("same asset"));
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        format!("{MINIMAL}\n[application]\nlog_level = \"verbose\"\n"),
        format!("{MINIMAL}\n[transfer]\nlimit = 0\n"),
        format!("{MINIMAL}\n[transfer]\ntimeout_seconds = 0\n"),
        format!("{MINIMAL}\n[logging]\nlocal_rotation = \"weekly\"\n"),
        MINIMAL.replace("https://kc.example.org", "kc.example.org"),
        MINIMAL.replace("\"dest-token\"", "\"\""),
    ];

    for contents in cases {
        let temp_file = write_config(&contents);
        let result = load_config(temp_file.path());
        assert!(
            matches!(result, Err(TransferError::Configuration(_))),
            "expected rejection of:\n{contents}"
        );
    }
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/kobo-transfer.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_missing_destination_section() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = MINIMAL
        .split("[destination]")
        .next()
        .unwrap()
        .to_string();
    let temp_file = write_config(&toml_content);

    assert!(load_config(temp_file.path()).is_err());
}
