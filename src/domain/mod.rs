//! Domain models and types for kobo-transfer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`AssetUid`], [`InstanceId`])
//! - **Submission documents** ([`SubmissionDocument`], [`FieldPath`])
//! - **Transfer metadata** ([`TransferMetadata`])
//! - **Outcomes and statistics** ([`Outcome`], [`TransferStats`])
//! - **Error types** ([`TransferError`], [`KoboError`], [`DocumentError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so an asset uid can never be passed where an
//! instance id is expected:
//!
//! ```rust
//! use kobo_transfer::domain::{AssetUid, InstanceId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let asset = AssetUid::new("aYqBrD4bXgw8hQdWNEt6mG")?;
//! let instance = InstanceId::from_instance_field("uuid:0b8a0c8e-8d54-4a36-9c3e-6f5fa0e3c6d1")?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod metadata;
pub mod outcome;
pub mod result;
pub mod submission;

// Re-export commonly used types for convenience
pub use errors::{DocumentError, KoboError, TransferError};
pub use ids::{AssetUid, InstanceId};
pub use metadata::TransferMetadata;
pub use outcome::{Outcome, SubmissionOutcome, TransferStats};
pub use result::Result;
pub use submission::{FieldPath, SubmissionDocument};
