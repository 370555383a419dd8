//! One-time lookup of the destination stamping values

use crate::adapters::kobo::KoboClient;
use crate::domain::metadata::format_version_label;
use crate::domain::{KoboError, Result, TransferMetadata};

/// Resolves [`TransferMetadata`] from the destination deployment
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    destination: KoboClient,
}

impl MetadataResolver {
    pub fn new(destination: KoboClient) -> Self {
        Self { destination }
    }

    /// Looks up the latest deployed version and the form hub id
    ///
    /// # Errors
    ///
    /// Returns an upstream error if either lookup fails, and a not-found error if the
    /// asset has no deployed version or the form listing has no entry for it.
    pub async fn resolve(&self) -> Result<TransferMetadata> {
        let asset_uid = self.destination.asset_uid().clone();

        let asset = self.destination.get_asset().await?;
        let versions = asset.deployed_versions;
        let latest = versions.results.first().ok_or_else(|| {
            KoboError::NotFound(format!("no deployed version for asset {asset_uid}"))
        })?;
        let version_label = format_version_label(versions.count, &latest.date_deployed);

        let forms = self.destination.get_forms().await?;
        let form = forms
            .into_iter()
            .find(|form| form.id_string == asset_uid.as_str())
            .ok_or_else(|| {
                KoboError::NotFound(format!(
                    "no form with id_string {asset_uid} on {}",
                    self.destination.deployment().kc_url
                ))
            })?;

        let metadata = TransferMetadata {
            destination_asset_id: asset_uid,
            destination_version: latest.uid.clone(),
            destination_version_label: version_label,
            destination_hub_id: form.uuid,
        };

        tracing::info!(
            asset_uid = %metadata.destination_asset_id,
            version = %metadata.destination_version,
            version_label = %metadata.destination_version_label,
            hub_id = %metadata.destination_hub_id,
            "Resolved destination metadata"
        );

        Ok(metadata)
    }
}
