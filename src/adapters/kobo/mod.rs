//! KoboToolbox adapter
//!
//! HTTP client and response models for the KPI (`kf`) and KoboCAT (`kc`) APIs.

pub mod client;
pub mod models;

pub use client::KoboClient;
pub use models::{
    is_terminal_token, AssetDetail, AttachmentRecord, DataPage, DataRecord, DeployedVersion,
    DeployedVersions, FormSummary, SubmissionPage, SubmissionQuery,
};
