//! Paginated traversal of the source submissions

use super::bundle::AttachmentBundler;
use super::rewrite::prepare;
use super::submit::Submitter;
use crate::adapters::kobo::KoboClient;
use crate::domain::{
    Outcome, Result, SubmissionDocument, SubmissionOutcome, TransferMetadata,
};
use crate::log_submission_outcome;
use crate::logging::ConsoleReporter;
use std::sync::Arc;
use tokio::sync::watch;

/// What a walk produced
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// Outcomes in traversal order
    pub outcomes: Vec<SubmissionOutcome>,

    /// Number of pages fetched
    pub pages: usize,

    /// True if the walk stopped on a shutdown signal
    pub interrupted: bool,
}

/// Drives pages of the source listing through rewrite, bundling and submission
pub struct PageWalker {
    source: KoboClient,
    submitter: Submitter,
    bundler: AttachmentBundler,
    metadata: Arc<TransferMetadata>,
    regenerate_ids: bool,
    reporter: ConsoleReporter,
    shutdown: watch::Receiver<bool>,
}

impl PageWalker {
    pub fn new(
        source: KoboClient,
        submitter: Submitter,
        bundler: AttachmentBundler,
        metadata: Arc<TransferMetadata>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            submitter,
            bundler,
            metadata,
            regenerate_ids: false,
            reporter: ConsoleReporter::default(),
            shutdown,
        }
    }

    /// Give every transferred submission a fresh instance id
    pub fn with_regenerated_ids(mut self, regenerate_ids: bool) -> Self {
        self.regenerate_ids = regenerate_ids;
        self
    }

    pub fn with_reporter(mut self, reporter: ConsoleReporter) -> Self {
        self.reporter = reporter;
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Walks the listing from `start_url` until the server stops returning a
    /// continuation token
    ///
    /// # Errors
    ///
    /// A failed page fetch aborts the walk. Per-submission problems never do; they
    /// are recorded as [`Outcome::Failed`].
    pub async fn walk(&self, start_url: &str) -> Result<WalkReport> {
        let mut report = WalkReport::default();
        let mut next_url = Some(start_url.to_string());

        while let Some(url) = next_url.take() {
            if self.is_shutdown_requested() {
                tracing::info!(pages = report.pages, "Shutdown requested, stopping before next page");
                report.interrupted = true;
                break;
            }

            let page = self.source.fetch_submission_page(&url).await?;
            report.pages += 1;
            tracing::info!(
                page = report.pages,
                submissions = page.submissions.len(),
                "Processing page"
            );

            for document in &page.submissions {
                if self.is_shutdown_requested() {
                    tracing::info!("Shutdown requested, stopping before next submission");
                    report.interrupted = true;
                    break;
                }
                report.outcomes.push(self.process(document).await);
            }

            if report.interrupted {
                break;
            }
            next_url = page.next;
        }

        Ok(report)
    }

    /// Transfers one submission; never fails
    async fn process(&self, document: &SubmissionDocument) -> SubmissionOutcome {
        let prepared = match prepare(document, &self.metadata, self.regenerate_ids) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping submission that cannot be prepared");
                return self.record(SubmissionOutcome::new(None, Outcome::Failed));
            }
        };

        let outcome = match self.send(&prepared).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    instance_id = %prepared.source_id,
                    error = %e,
                    "Failed to transfer submission"
                );
                Outcome::Failed
            }
        };

        self.record(SubmissionOutcome::new(Some(prepared.source_id), outcome))
    }

    async fn send(&self, prepared: &super::rewrite::PreparedSubmission) -> Result<Outcome> {
        let attachments = self.bundler.bundle(&prepared.source_id).await?;
        let bytes = prepared.document.to_bytes()?;
        tracing::debug!(
            instance_id = %prepared.source_id,
            submitted_as = %prepared.submitted_id,
            attachments = attachments.len(),
            "Submitting"
        );
        self.submitter
            .submit(bytes, &prepared.submitted_id, &attachments)
            .await
    }

    fn record(&self, outcome: SubmissionOutcome) -> SubmissionOutcome {
        log_submission_outcome!(outcome.instance_id.as_ref(), outcome.outcome);
        self.reporter
            .outcome(outcome.instance_id.as_ref(), outcome.outcome);
        outcome
    }
}
