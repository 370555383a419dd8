//! Submission transfer engine
//!
//! - [`metadata`] - one-time lookup of destination version and hub id
//! - [`walker`] - paginated traversal of the source listing
//! - [`rewrite`] - destination rewriting of each document
//! - [`bundle`] - staged attachment lookup
//! - [`submit`] - multipart upload and outcome classification
//! - [`summary`] - run statistics
//! - [`coordinator`] - orchestration of a complete run

pub mod bundle;
pub mod coordinator;
pub mod metadata;
pub mod rewrite;
pub mod submit;
pub mod summary;
pub mod walker;

pub use bundle::{AttachmentBundler, StagedAttachment};
pub use coordinator::{TransferCoordinator, TransferOptions};
pub use metadata::MetadataResolver;
pub use rewrite::{prepare, rewrite, PreparedSubmission};
pub use submit::Submitter;
pub use summary::TransferSummary;
pub use walker::{PageWalker, WalkReport};
