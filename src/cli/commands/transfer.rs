//! Transfer command implementation
//!
//! This module implements the `transfer` command, which copies submissions and
//! their attachments from the source deployment to the destination.

use crate::config::load_config;
use crate::config::schema::MAX_PAGE_LIMIT;
use crate::core::transfer::{TransferCoordinator, TransferOptions, TransferSummary};
use crate::domain::TransferError;
use crate::log_error_with_context;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the transfer command
#[derive(Args, Debug, Default)]
pub struct TransferArgs {
    /// Number of submissions per page (1-30000)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_PAGE_LIMIT as u64))]
    pub limit: Option<u64>,

    /// Only transfer the submissions that failed in the previous run
    #[arg(long)]
    pub last_failed: bool,

    /// Keep downloaded attachments after the transfer
    #[arg(short, long)]
    pub keep_media: bool,

    /// Give every transferred submission a new instance id
    #[arg(short = 'R', long)]
    pub regenerate_uuids: bool,

    /// Suppress per-submission output
    #[arg(short, long)]
    pub quiet: bool,

    /// Only transfer the instance ids listed in FILE (one per line)
    #[arg(short = 'F', long, value_name = "FILE")]
    pub filter_uuids: Option<PathBuf>,

    /// Do not download attachments; use what is already staged
    #[arg(long)]
    pub skip_media: bool,
}

impl TransferArgs {
    fn options(&self) -> TransferOptions {
        TransferOptions {
            limit: self.limit.map(|limit| limit as usize),
            last_failed: self.last_failed,
            filter_file: self.filter_uuids.clone(),
            keep_media: self.keep_media,
            skip_media: self.skip_media,
            regenerate_ids: self.regenerate_uuids,
            quiet: self.quiet,
        }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting transfer command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                log_error_with_context!(e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.regenerate_uuids {
            tracing::warn!("Regenerating instance ids; re-running this transfer will create duplicates");
        }

        let coordinator = match TransferCoordinator::new(config, self.options(), shutdown_signal) {
            Ok(coordinator) => coordinator,
            Err(e) => {
                log_error_with_context!(e, "Failed to initialize transfer");
                eprintln!("Failed to initialize transfer: {e}");
                return Ok(2);
            }
        };

        let summary = match coordinator.execute().await {
            Ok(summary) => summary,
            Err(e) => {
                log_error_with_context!(e, "Transfer failed");
                eprintln!("Transfer failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        Ok(self.finish(&summary))
    }

    fn finish(&self, summary: &TransferSummary) -> i32 {
        let code = exit_code(summary);
        if self.quiet {
            return code;
        }

        println!("⏱️  {:.2}s", summary.duration.as_secs_f64());
        if summary.interrupted {
            println!("⚠️  Transfer interrupted. Run the same command again to continue;");
            println!("   submissions already at the destination will be reported as duplicates.");
        } else if summary.stats.failed > 0 {
            println!("⚠️  Transfer completed with failures. Retry them with --last-failed.");
        } else {
            println!("✅ Transfer completed successfully!");
        }
        code
    }
}

/// Exit code of a completed run
pub fn exit_code(summary: &TransferSummary) -> i32 {
    if summary.interrupted {
        130
    } else if summary.is_successful() {
        0
    } else {
        1
    }
}

/// Exit code of a run that aborted with an error
pub fn error_exit_code(error: &TransferError) -> i32 {
    match error {
        TransferError::Configuration(_) => 2,
        TransferError::Kobo(_) => 4,
        _ => 5,
    }
}
