//! Per-object transform: eligibility check, download, transcode, upload.
//!
//! `ItemTransformer::process` never returns an error. Every failure is turned
//! into a [`TransformOutcome::Failed`] so the batch above it can keep going.

mod config;
mod error;
mod naming;
mod transformer;
mod types;

pub use config::{NamingPolicy, TransformConfig};
pub use error::TransformError;
pub use naming::{destination_key, replace_extension};
pub use transformer::ItemTransformer;
pub use types::{SkipReason, TransformOutcome};
