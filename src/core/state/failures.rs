//! Record of failed submissions and instance id lists
//!
//! Both the failures file and user supplied filter files are plain text with one
//! instance id per line. Blank lines and lines starting with `#` are ignored; a
//! leading `uuid:` is accepted.

use crate::domain::{InstanceId, Result, TransferError};
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Failed instance ids of the previous run
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the recorded ids; a missing file records nothing
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load(&self) -> Result<Vec<InstanceId>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(parse_instance_ids(&contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(TransferError::Io(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Replaces the recorded ids
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub async fn save(&self, ids: &[InstanceId]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TransferError::Io(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let mut contents = format!(
            "# failed submissions, {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        for id in ids {
            contents.push_str(id.as_str());
            contents.push('\n');
        }

        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            TransferError::Io(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        tracing::debug!(path = %self.path.display(), count = ids.len(), "Saved failure log");
        Ok(())
    }
}

/// Reads a user supplied list of instance ids
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn read_instance_list(path: &Path) -> Result<Vec<InstanceId>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TransferError::Io(format!("Failed to read {}: {e}", path.display())))?;
    Ok(parse_instance_ids(&contents))
}

/// Parses one id per line, dropping duplicates and keeping first-seen order
pub fn parse_instance_ids(contents: &str) -> Vec<InstanceId> {
    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match InstanceId::from_instance_field(line) {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            Err(e) => tracing::warn!(line = index + 1, error = %e, "Ignoring invalid instance id"),
        }
    }

    ids
}

/// Combines the optional restrictions on which submissions to transfer
///
/// `None` means no restriction. When both lists are given only ids present in both
/// are kept, in the order of `last_failed`.
pub fn select_instances(
    last_failed: Option<Vec<InstanceId>>,
    filter: Option<Vec<InstanceId>>,
) -> Option<Vec<InstanceId>> {
    match (last_failed, filter) {
        (None, None) => None,
        (Some(ids), None) | (None, Some(ids)) => Some(ids),
        (Some(failed), Some(filter)) => {
            let filter: BTreeSet<InstanceId> = filter.into_iter().collect();
            Some(failed.into_iter().filter(|id| filter.contains(id)).collect())
        }
    }
}

/// Ids to record after an interrupted run
///
/// The new failures come first, followed by previously recorded ids that were not
/// attempted before the run stopped. Duplicates are dropped.
pub fn carry_over(
    previous: Vec<InstanceId>,
    attempted: &[InstanceId],
    failed: &[InstanceId],
) -> Vec<InstanceId> {
    let attempted: BTreeSet<&InstanceId> = attempted.iter().collect();
    let mut seen = BTreeSet::new();

    failed
        .iter()
        .cloned()
        .chain(previous.into_iter().filter(|id| !attempted.contains(id)))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
