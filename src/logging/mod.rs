//! Logging and console output
//!
//! - Structured logging through `tracing` with configurable levels
//! - Optional local JSON file logging with rotation
//! - Console status lines for each transferred submission
//!
//! # Example
//!
//! ```no_run
//! use kobo_transfer::logging::init_logging;
//! use kobo_transfer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod console;
pub mod structured;

pub use console::ConsoleReporter;
pub use structured::{init_logging, LoggingGuard};

/// Log the outcome of one submission
///
/// # Example
///
/// ```no_run
/// use kobo_transfer::log_submission_outcome;
/// use kobo_transfer::domain::{InstanceId, Outcome};
///
/// let id = InstanceId::new("a1").unwrap();
/// log_submission_outcome!(Some(&id), Outcome::Created);
/// ```
#[macro_export]
macro_rules! log_submission_outcome {
    ($instance_id:expr, $outcome:expr) => {
        match $instance_id {
            Some(id) => tracing::info!(instance_id = %id, outcome = %$outcome, "Submission processed"),
            None => tracing::info!(outcome = %$outcome, "Submission processed"),
        }
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use kobo_transfer::log_error_with_context;
/// use kobo_transfer::domain::TransferError;
///
/// let error = TransferError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
