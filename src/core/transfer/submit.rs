//! Upload of one rewritten submission to the destination

use super::bundle::StagedAttachment;
use crate::adapters::kobo::KoboClient;
use crate::domain::{InstanceId, Outcome, Result, TransferError};
use reqwest::multipart::{Form, Part};

/// Multipart field name of the submission document
pub const XML_SUBMISSION_FIELD: &str = "xml_submission_file";

/// Sends submissions to the destination ingestion endpoint
#[derive(Debug, Clone)]
pub struct Submitter {
    destination: KoboClient,
}

impl Submitter {
    pub fn new(destination: KoboClient) -> Self {
        Self { destination }
    }

    /// Builds the multipart payload
    ///
    /// Attachment bytes are read here and released with the form.
    ///
    /// # Errors
    ///
    /// Returns a staging error if an attachment cannot be read.
    pub async fn build_form(
        document: Vec<u8>,
        instance_id: &InstanceId,
        attachments: &[StagedAttachment],
    ) -> Result<Form> {
        let xml_part = Part::bytes(document)
            .file_name(instance_id.to_string())
            .mime_str("text/xml")
            .map_err(|e| TransferError::Other(format!("Invalid MIME type: {e}")))?;
        let mut form = Form::new().part(XML_SUBMISSION_FIELD, xml_part);

        for attachment in attachments {
            let bytes = tokio::fs::read(&attachment.path).await.map_err(|e| {
                TransferError::Staging(format!(
                    "Failed to read attachment {}: {e}",
                    attachment.path.display()
                ))
            })?;
            form = form.part(
                attachment.name.clone(),
                Part::bytes(bytes).file_name(attachment.name.clone()),
            );
        }

        Ok(form)
    }

    /// Submits one document with its attachments and classifies the response
    ///
    /// 201 is [`Outcome::Created`], 202 is [`Outcome::Duplicate`], any other status
    /// and any transport error is [`Outcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns a staging error if an attachment cannot be read; nothing is sent in
    /// that case.
    pub async fn submit(
        &self,
        document: Vec<u8>,
        instance_id: &InstanceId,
        attachments: &[StagedAttachment],
    ) -> Result<Outcome> {
        let form = Self::build_form(document, instance_id, attachments).await?;

        match self.destination.post_submission(form).await {
            Ok(status) => {
                let outcome = Outcome::from_status(status);
                if outcome == Outcome::Failed {
                    tracing::warn!(
                        instance_id = %instance_id,
                        status = status,
                        "Destination rejected submission"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    instance_id = %instance_id,
                    error = %e,
                    "Failed to send submission"
                );
                Ok(Outcome::Failed)
            }
        }
    }
}
