//! Staging directory layout

use crate::domain::ids::{AssetUid, InstanceId};
use std::path::{Path, PathBuf};

/// Paths of the staging area for one source asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    root: PathBuf,
    asset_uid: AssetUid,
}

impl StagingLayout {
    pub fn new(root: impl Into<PathBuf>, asset_uid: AssetUid) -> Self {
        Self {
            root: root.into(),
            asset_uid,
        }
    }

    /// Staging root shared by all assets
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every staged file of the asset
    pub fn asset_dir(&self) -> PathBuf {
        self.root.join(self.asset_uid.as_str())
    }

    /// Directory holding the attachments of one submission
    pub fn instance_dir(&self, instance_id: &InstanceId) -> PathBuf {
        self.asset_dir().join(instance_id.as_str())
    }
}
