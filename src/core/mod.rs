//! Core business logic for kobo-transfer.
//!
//! # Modules
//!
//! - [`transfer`] - Transfer orchestration, rewriting, submission and statistics
//! - [`state`] - Failure log and instance id selection between runs
//!
//! # Transfer Workflow
//!
//! 1. **Select**: optionally restrict to the last failed or listed instance ids
//! 2. **Resolve**: look up the destination's deployed version and form hub id
//! 3. **Stage**: download source attachments to the staging directory
//! 4. **Walk**: fetch source pages and, per submission, rewrite, bundle and submit
//! 5. **Record**: write failed instance ids for a later `--last-failed` run
//! 6. **Report**: print and log the summary
//!
//! # Example
//!
//! ```rust,no_run
//! use kobo_transfer::config::load_config;
//! use kobo_transfer::core::transfer::{TransferCoordinator, TransferOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kobo-transfer.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = TransferCoordinator::new(config, TransferOptions::default(), shutdown_rx)?;
//! let summary = coordinator.execute().await?;
//!
//! println!("Created: {}", summary.stats.created);
//! println!("Duplicate: {}", summary.stats.duplicate);
//! println!("Failed: {}", summary.stats.failed);
//! # Ok(())
//! # }
//! ```

pub mod state;
pub mod transfer;
