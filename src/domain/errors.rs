//! Domain error types
//!
//! This module defines the error hierarchy for kobo-transfer.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main transfer error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// KoboToolbox API errors
    #[error("Kobo error: {0}")]
    Kobo(#[from] KoboError),

    /// Submission document errors
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Attachment staging errors
    #[error("Staging error: {0}")]
    Staging(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl TransferError {
    /// Whether the error came from an upstream listing or lookup
    /// (non-success status or missing entry) rather than local state
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TransferError::Kobo(KoboError::Upstream { .. }) | TransferError::Kobo(KoboError::NotFound(_))
        )
    }
}

/// KoboToolbox API errors
///
/// Errors that occur when talking to a source or destination deployment.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum KoboError {
    /// Failed to reach the server
    #[error("Failed to connect to Kobo server: {0}")]
    ConnectionFailed(String),

    /// Server answered with a non-success status
    #[error("Upstream request to {url} failed with status {status}")]
    Upstream { status: u16, url: String },

    /// An expected entry is missing from a listing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl KoboError {
    /// Returns true if repeating the request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            KoboError::ConnectionFailed(_) | KoboError::Timeout(_) => true,
            KoboError::Upstream { status, .. } => *status >= 500,
            KoboError::NotFound(_) | KoboError::InvalidResponse(_) => false,
        }
    }
}

/// Submission document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    /// XML could not be parsed
    #[error("Failed to parse submission XML: {0}")]
    Parse(String),

    /// XML could not be written
    #[error("Failed to serialize submission XML: {0}")]
    Serialize(String),

    /// A required field is absent
    #[error("Missing field '{0}'")]
    MissingField(String),

    /// Field path nests deeper than one group
    #[error("Unsupported field path '{0}': at most one group level is supported")]
    UnsupportedPath(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        TransferError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        TransferError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TransferError {
    fn from(err: toml::de::Error) -> Self {
        TransferError::Configuration(format!("TOML parse error: {err}"))
    }
}
