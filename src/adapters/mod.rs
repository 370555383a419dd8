//! External system integrations for kobo-transfer.
//!
//! - [`kobo`] - KoboToolbox HTTP client (KPI and KoboCAT APIs)
//! - [`staging`] - Local attachment staging (trait-based)
//!
//! # Design Pattern
//!
//! Adapters isolate external systems from the transfer core. Attachment staging sits
//! behind the [`staging::AttachmentStaging`] trait so a run can be wired with the
//! network-backed [`staging::MediaStager`] or with a pre-populated directory.
//!
//! ```rust,no_run
//! use kobo_transfer::adapters::kobo::KoboClient;
//! use kobo_transfer::adapters::staging::{AttachmentStaging, MediaStager};
//! use kobo_transfer::config::load_config;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kobo-transfer.toml")?;
//! let source = KoboClient::new(
//!     config.source.clone(),
//!     Duration::from_secs(config.transfer.timeout_seconds),
//!     config.transfer.retry.clone(),
//! )?;
//! let stager = MediaStager::new(source, &config.transfer.staging_dir, config.transfer.limit);
//! let report = stager.fetch_all().await?;
//! println!("{} attachments downloaded", report.downloaded);
//! # Ok(())
//! # }
//! ```

pub mod kobo;
pub mod staging;
