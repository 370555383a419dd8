//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through a transfer.
//! Each type ensures type safety and provides validation for format compliance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix KoboToolbox puts in front of instance identifiers stored in `meta/instanceID`
pub const UUID_PREFIX: &str = "uuid:";

/// Asset (form/project) identifier newtype wrapper
///
/// Assets are shared identically between the source and destination deployments;
/// only their uid differs.
///
/// # Examples
///
/// ```
/// use kobo_transfer::domain::ids::AssetUid;
/// use std::str::FromStr;
///
/// let asset_uid = AssetUid::from_str("aYqBrD4bXgw8hQdWNEt6mG").unwrap();
/// assert_eq!(asset_uid.as_str(), "aYqBrD4bXgw8hQdWNEt6mG");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetUid(String);

impl AssetUid {
    /// Creates a new AssetUid from a string
    ///
    /// The uid is used verbatim as an XML element name, so it must be non-empty
    /// and free of whitespace and path separators.
    pub fn new(uid: impl Into<String>) -> Result<Self, String> {
        let uid = uid.into();
        if uid.trim().is_empty() {
            return Err("Asset uid cannot be empty".to_string());
        }
        if uid.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
            return Err(format!(
                "Asset uid '{uid}' must not contain whitespace or path separators"
            ));
        }
        if uid == "." || uid == ".." {
            return Err(format!("Asset uid '{uid}' is not a valid directory name"));
        }
        Ok(Self(uid))
    }

    /// Returns the asset uid as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetUid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AssetUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Submission instance identifier
///
/// The globally unique key of one submission and the deduplication key at the
/// destination. Always stored without the `uuid:` prefix.
///
/// # Examples
///
/// ```
/// use kobo_transfer::domain::ids::InstanceId;
///
/// let id = InstanceId::from_instance_field("uuid:0b8a0c8e-8d54-4a36-9c3e-6f5fa0e3c6d1").unwrap();
/// assert_eq!(id.as_str(), "0b8a0c8e-8d54-4a36-9c3e-6f5fa0e3c6d1");
/// assert_eq!(id.to_instance_field(), "uuid:0b8a0c8e-8d54-4a36-9c3e-6f5fa0e3c6d1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    /// Creates a new InstanceId from a bare identifier
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Instance id cannot be empty".to_string());
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(format!("Instance id '{trimmed}' must not contain path separators"));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(format!("Instance id '{trimmed}' is not a valid directory name"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parses the value of a `meta/instanceID` field, stripping a literal `uuid:` prefix
    ///
    /// Bare identifiers are accepted unchanged.
    pub fn from_instance_field(value: &str) -> Result<Self, String> {
        let value = value.trim();
        Self::new(value.strip_prefix(UUID_PREFIX).unwrap_or(value))
    }

    /// Generates a fresh random (v4) identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the instance id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the value stored in `meta/instanceID` (`uuid:` + id)
    pub fn to_instance_field(&self) -> String {
        format!("{UUID_PREFIX}{}", self.0)
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_instance_field(s)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
