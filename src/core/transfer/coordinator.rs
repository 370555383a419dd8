//! Transfer coordinator - main orchestrator for a transfer run
//!
//! Wires the source and destination clients, attachment staging, the metadata
//! resolver and the page walker together, and keeps the failure log up to date.

use super::bundle::AttachmentBundler;
use super::metadata::MetadataResolver;
use super::submit::Submitter;
use super::summary::TransferSummary;
use super::walker::PageWalker;
use crate::adapters::kobo::{KoboClient, SubmissionQuery};
use crate::adapters::staging::{AttachmentStaging, MediaStager};
use crate::config::schema::MAX_PAGE_LIMIT;
use crate::config::TransferConfig;
use crate::core::state::{carry_over, read_instance_list, select_instances, FailureLog};
use crate::domain::{InstanceId, Result, TransferError};
use crate::logging::ConsoleReporter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Per-run options, usually taken from the command line
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Page size; defaults to `transfer.limit`
    pub limit: Option<usize>,

    /// Only transfer the submissions that failed in the previous run
    pub last_failed: bool,

    /// Only transfer the instance ids listed in this file
    pub filter_file: Option<PathBuf>,

    /// Keep staged attachments after the run
    pub keep_media: bool,

    /// Do not download attachments; use whatever is already staged
    pub skip_media: bool,

    /// Give every submission a new instance id
    pub regenerate_ids: bool,

    /// Suppress console status lines
    pub quiet: bool,
}

/// Transfer coordinator
pub struct TransferCoordinator {
    config: TransferConfig,
    options: TransferOptions,
    source: KoboClient,
    destination: KoboClient,
    staging: Option<Arc<dyn AttachmentStaging>>,
    failure_log: FailureLog,
    reporter: ConsoleReporter,
    shutdown: watch::Receiver<bool>,
}

impl TransferCoordinator {
    /// Create a new transfer coordinator
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an out of range page size or if an HTTP
    /// client cannot be built.
    pub fn new(
        config: TransferConfig,
        options: TransferOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let limit = options.limit.unwrap_or(config.transfer.limit);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(TransferError::Configuration(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}, got {limit}"
            )));
        }

        let timeout = Duration::from_secs(config.transfer.timeout_seconds);
        let source = KoboClient::new(
            config.source.clone(),
            timeout,
            config.transfer.retry.clone(),
        )?;
        let destination = KoboClient::new(
            config.destination.clone(),
            timeout,
            config.transfer.retry.clone(),
        )?;

        let failure_log = FailureLog::new(config.transfer.failures_file.clone());
        let reporter = ConsoleReporter::new(options.quiet);

        Ok(Self {
            config,
            options,
            source,
            destination,
            staging: None,
            failure_log,
            reporter,
            shutdown,
        })
    }

    /// Use a custom attachment staging backend instead of downloading from the source
    pub fn with_staging(mut self, staging: Arc<dyn AttachmentStaging>) -> Self {
        self.staging = Some(staging);
        self
    }

    fn page_size(&self) -> usize {
        self.options.limit.unwrap_or(self.config.transfer.limit)
    }

    fn keep_media(&self) -> bool {
        self.options.keep_media || self.config.transfer.keep_media
    }

    fn is_shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Execute the transfer
    ///
    /// 1. Determine which submissions to transfer (all, last failed, filter file)
    /// 2. Resolve destination metadata
    /// 3. Stage attachments
    /// 4. Walk the source pages, submitting each document
    /// 5. Record failures, clean up staging and report
    ///
    /// # Errors
    ///
    /// Fails on configuration problems, destination metadata lookups, staging setup
    /// and source page fetches. Individual submissions never fail the run.
    pub async fn execute(&self) -> Result<TransferSummary> {
        let start_time = Instant::now();

        tracing::info!(
            source = %self.config.source.asset_uid,
            destination = %self.config.destination.asset_uid,
            "Starting transfer"
        );

        let query = match self.resolve_selection().await? {
            None => None,
            Some(ids) if ids.is_empty() => {
                tracing::info!("Selection is empty, nothing to transfer");
                self.reporter.message("Nothing to transfer.");
                let summary = TransferSummary::default().with_duration(start_time.elapsed());
                self.reporter.summary(&summary.stats);
                return Ok(summary);
            }
            Some(ids) => {
                tracing::info!(count = ids.len(), "Restricting transfer to selected submissions");
                Some(SubmissionQuery::for_instances(ids))
            }
        };

        let metadata = Arc::new(MetadataResolver::new(self.destination.clone()).resolve().await?);

        let staging = self.staging_backend(query.clone());
        let staging_report = if self.options.skip_media {
            tracing::info!("Skipping attachment download");
            None
        } else if self.is_shutdown_requested() {
            None
        } else {
            Some(staging.fetch_all().await?)
        };

        let start_url = self
            .source
            .submissions_start_url(self.page_size(), query.as_ref())?;
        let walker = PageWalker::new(
            self.source.clone(),
            Submitter::new(self.destination.clone()),
            AttachmentBundler::new(staging.layout().clone()),
            metadata,
            self.shutdown.clone(),
        )
        .with_regenerated_ids(self.options.regenerate_ids)
        .with_reporter(self.reporter);

        let report = walker.walk(&start_url).await?;

        let summary = TransferSummary::from_walk(&report)
            .with_staging(staging_report)
            .with_duration(start_time.elapsed());

        let recorded = if summary.interrupted {
            let attempted: Vec<InstanceId> = report
                .outcomes
                .iter()
                .filter_map(|o| o.instance_id.clone())
                .collect();
            carry_over(self.failure_log.load().await?, &attempted, &summary.failed_ids)
        } else {
            summary.failed_ids.clone()
        };

        self.failure_log.save(&recorded).await?;
        if !recorded.is_empty() {
            tracing::info!(
                path = %self.failure_log.path().display(),
                count = recorded.len(),
                "Failed submissions recorded, rerun with --last-failed to retry them"
            );
        }

        if self.keep_media() {
            tracing::info!(dir = %staging.layout().asset_dir().display(), "Keeping staged attachments");
        } else if summary.interrupted {
            tracing::info!("Run interrupted, keeping staged attachments for the next run");
        } else if let Err(e) = staging.delete_all().await {
            tracing::warn!(error = %e, "Failed to remove staged attachments");
        }

        summary.log_summary();
        self.reporter.summary(&summary.stats);

        Ok(summary)
    }

    /// Loads the last-failed and filter lists and combines them
    async fn resolve_selection(&self) -> Result<Option<Vec<InstanceId>>> {
        let last_failed = if self.options.last_failed {
            let ids = self.failure_log.load().await?;
            if ids.is_empty() {
                tracing::info!(
                    path = %self.failure_log.path().display(),
                    "No recorded failures, transferring all submissions"
                );
                None
            } else {
                Some(ids)
            }
        } else {
            None
        };

        let filter = match &self.options.filter_file {
            Some(path) => Some(read_instance_list(path).await?),
            None => None,
        };

        Ok(select_instances(last_failed, filter))
    }

    fn staging_backend(&self, query: Option<SubmissionQuery>) -> Arc<dyn AttachmentStaging> {
        match &self.staging {
            Some(staging) => staging.clone(),
            None => Arc::new(
                MediaStager::new(
                    self.source.clone(),
                    self.config.transfer.staging_dir.clone(),
                    self.page_size(),
                )
                .with_query(query),
            ),
        }
    }
}
