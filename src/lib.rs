// kobo-transfer - KoboToolbox submission transfer tool
// Copyright (c) 2025 kobo-transfer Contributors
// Licensed under the MIT License

//! # kobo-transfer
//!
//! Copies form submissions and their attachments from one KoboToolbox project to
//! another project with the same form, possibly on a different server.
//!
//! ## Overview
//!
//! - **Reads** submissions page by page from the source project's XML listing
//! - **Rewrites** each document for the destination (form id, version, form hub id)
//! - **Uploads** it with its staged attachments to the destination ingestion endpoint
//! - **Classifies** each response as created, duplicate or failed
//!
//! Instance ids are kept, so the destination detects submissions it already has and
//! a transfer can be re-run safely.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Transfer engine and run state
//! - [`adapters`] - KoboToolbox HTTP client and attachment staging
//! - [`domain`] - Identifiers, submission documents, outcomes and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and console output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kobo_transfer::config::load_config;
//! use kobo_transfer::core::transfer::{TransferCoordinator, TransferOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("kobo-transfer.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = TransferCoordinator::new(config, TransferOptions::default(), shutdown_rx)?;
//!     let summary = coordinator.execute().await?;
//!
//!     println!("{}", summary.stats);
//!     Ok(())
//! }
//! ```
//!
//! ## Rewriting
//!
//! ```rust
//! use kobo_transfer::core::transfer::rewrite;
//! use kobo_transfer::domain::{AssetUid, SubmissionDocument, TransferMetadata};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = TransferMetadata {
//!     destination_asset_id: AssetUid::new("aDest")?,
//!     destination_version: "vLatest".to_string(),
//!     destination_version_label: "4 (2024-05-02 08:15:00)".to_string(),
//!     destination_hub_id: "0f3e9b6b2c1d4a5f".to_string(),
//! };
//! let source = SubmissionDocument::parse(
//!     r#"<aSrc id="aSrc" version="vOld"><meta><instanceID>uuid:a1</instanceID></meta></aSrc>"#,
//! )?;
//!
//! let rewritten = rewrite(&source, &metadata);
//! assert_eq!(rewritten.root_tag(), "aDest");
//! assert_eq!(rewritten.instance_id()?.as_str(), "a1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::TransferError`]:
//!
//! ```rust,no_run
//! use kobo_transfer::domain::TransferError;
//!
//! fn example() -> Result<(), TransferError> {
//!     let config = kobo_transfer::config::load_config("kobo-transfer.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
