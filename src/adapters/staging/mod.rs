//! Attachment staging
//!
//! Attachments are downloaded from the source deployment into a local directory tree
//! before the transfer, then read back when each submission is uploaded:
//!
//! ```text
//! <staging_dir>/<source asset uid>/<instance id>/<file name>
//! ```

pub mod layout;
pub mod media;

pub use layout::StagingLayout;
pub use media::MediaStager;

use crate::domain::Result;
use async_trait::async_trait;

/// Counts reported by a staging fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingReport {
    /// Files downloaded during this fetch
    pub downloaded: usize,

    /// Files already present in the staging directory
    pub skipped: usize,

    /// Attachments that could not be downloaded
    pub failed: usize,
}

/// Populates and clears the local attachment staging area
#[async_trait]
pub trait AttachmentStaging: Send + Sync {
    /// Download every attachment of the source asset into the staging area
    ///
    /// # Errors
    ///
    /// Returns an error if the submission listing cannot be read or the staging
    /// directory cannot be created. Individual download failures are counted in the
    /// report instead.
    async fn fetch_all(&self) -> Result<StagingReport>;

    /// Remove everything staged for the source asset
    ///
    /// # Errors
    ///
    /// Returns an error if the staging directory exists but cannot be removed.
    async fn delete_all(&self) -> Result<()>;

    /// Directory layout the staged files live in
    fn layout(&self) -> &StagingLayout;
}
