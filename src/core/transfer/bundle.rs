//! Lookup of staged attachments for one submission

use crate::adapters::staging::StagingLayout;
use crate::domain::{InstanceId, Result, TransferError};
use std::io::ErrorKind;
use std::path::PathBuf;

/// An attachment file found in the staging area
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StagedAttachment {
    /// Original file name; used as both the part name and the part file name
    pub name: String,

    /// Location of the file on disk
    pub path: PathBuf,
}

/// Lists the staged attachments of a submission
#[derive(Debug, Clone)]
pub struct AttachmentBundler {
    layout: StagingLayout,
}

impl AttachmentBundler {
    pub fn new(layout: StagingLayout) -> Self {
        Self { layout }
    }

    /// Returns every regular file in the submission's staging directory, by name
    ///
    /// A missing directory means the submission has no attachments.
    ///
    /// # Errors
    ///
    /// Returns a staging error if the directory exists but cannot be listed.
    pub async fn bundle(&self, instance_id: &InstanceId) -> Result<Vec<StagedAttachment>> {
        let dir = self.layout.instance_dir(instance_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TransferError::Staging(format!(
                    "Failed to list {}: {e}",
                    dir.display()
                )))
            }
        };

        let mut attachments = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            TransferError::Staging(format!("Failed to list {}: {e}", dir.display()))
        })? {
            let file_type = entry.file_type().await.map_err(|e| {
                TransferError::Staging(format!("Failed to stat {}: {e}", entry.path().display()))
            })?;
            if !file_type.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %entry.path().display(), "Skipping attachment with non UTF-8 name");
                continue;
            };
            attachments.push(StagedAttachment {
                name,
                path: entry.path(),
            });
        }

        attachments.sort();
        Ok(attachments)
    }
}
