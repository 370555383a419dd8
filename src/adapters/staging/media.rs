//! Attachment staging backed by the source deployment's JSON listing

use super::{AttachmentStaging, StagingLayout, StagingReport};
use crate::adapters::kobo::{is_terminal_token, KoboClient, SubmissionQuery};
use crate::domain::errors::TransferError;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use url::Url;

/// Downloads source attachments into a [`StagingLayout`]
///
/// Walks `data/?format=json` following `next`, and downloads every
/// `_attachments[].download_url` to `<instance dir>/<file name>`. Files already on
/// disk are not downloaded again, so an interrupted fetch can be resumed.
pub struct MediaStager {
    client: KoboClient,
    layout: StagingLayout,
    page_size: usize,
    query: Option<SubmissionQuery>,
}

impl MediaStager {
    /// Create a stager for the client's asset rooted at `staging_root`
    pub fn new(client: KoboClient, staging_root: impl Into<PathBuf>, page_size: usize) -> Self {
        let layout = StagingLayout::new(staging_root, client.asset_uid().clone());
        Self {
            client,
            layout,
            page_size,
            query: None,
        }
    }

    /// Only stage attachments of submissions matching `query`
    pub fn with_query(mut self, query: Option<SubmissionQuery>) -> Self {
        self.query = query;
        self
    }

    fn start_url(&self) -> Result<String> {
        let base = self.client.deployment().data_json_url();
        let mut url = Url::parse(&base)
            .map_err(|e| TransferError::Configuration(format!("Invalid data URL '{base}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("limit", &self.page_size.to_string());
            if let Some(query) = &self.query {
                pairs.append_pair("query", &query.to_json());
            }
        }
        Ok(url.into())
    }
}

#[async_trait]
impl AttachmentStaging for MediaStager {
    async fn fetch_all(&self) -> Result<StagingReport> {
        let asset_dir = self.layout.asset_dir();
        tokio::fs::create_dir_all(&asset_dir).await.map_err(|e| {
            TransferError::Staging(format!("Failed to create {}: {e}", asset_dir.display()))
        })?;

        let mut report = StagingReport::default();
        let mut url = self.start_url()?;

        loop {
            let page = self.client.get_data_page(&url).await?;

            for record in &page.results {
                if record.attachments.is_empty() {
                    continue;
                }
                let Some(instance_id) = record.instance_id() else {
                    tracing::warn!(
                        attachments = record.attachments.len(),
                        "Skipping attachments of a submission without instance id"
                    );
                    report.failed += record.attachments.len();
                    continue;
                };

                let instance_dir = self.layout.instance_dir(&instance_id);
                for attachment in &record.attachments {
                    let Some(file_name) = attachment.file_name() else {
                        tracing::warn!(
                            instance_id = %instance_id,
                            url = %attachment.download_url,
                            "Attachment has no usable file name"
                        );
                        report.failed += 1;
                        continue;
                    };

                    let path = instance_dir.join(file_name);
                    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                        report.skipped += 1;
                        continue;
                    }

                    tokio::fs::create_dir_all(&instance_dir).await.map_err(|e| {
                        TransferError::Staging(format!(
                            "Failed to create {}: {e}",
                            instance_dir.display()
                        ))
                    })?;

                    match self.client.download(&attachment.download_url, &path).await {
                        Ok(()) => {
                            tracing::debug!(
                                instance_id = %instance_id,
                                file = %file_name,
                                "Staged attachment"
                            );
                            report.downloaded += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                instance_id = %instance_id,
                                file = %file_name,
                                error = %e,
                                "Failed to download attachment"
                            );
                            report.failed += 1;
                        }
                    }
                }
            }

            match page.next {
                Some(next) if !is_terminal_token(Some(&next)) => url = next,
                _ => break,
            }
        }

        tracing::info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            failed = report.failed,
            dir = %asset_dir.display(),
            "Attachment staging complete"
        );

        Ok(report)
    }

    async fn delete_all(&self) -> Result<()> {
        let asset_dir = self.layout.asset_dir();
        if !tokio::fs::try_exists(&asset_dir).await.unwrap_or(false) {
            return Ok(());
        }

        tokio::fs::remove_dir_all(&asset_dir).await.map_err(|e| {
            TransferError::Staging(format!("Failed to remove {}: {e}", asset_dir.display()))
        })?;
        tracing::info!(dir = %asset_dir.display(), "Removed staged attachments");
        Ok(())
    }

    fn layout(&self) -> &StagingLayout {
        &self.layout
    }
}
