//! Batch orchestrator: list the bucket, fan objects out to a bounded worker
//! pool, collect every outcome.
//!
//! The runner is a single producer. It pulls one listing page at a time and
//! acquires a worker permit before spawning each transform, so it suspends
//! while the pool is full instead of queueing the whole bucket. Outcomes flow
//! over a channel to one collector task, which owns the summary.
//!
//! # Example
//!
//! ```ignore
//! use objconv_core::batch::{BatchConfig, BatchRunner};
//!
//! let runner = BatchRunner::new(BatchConfig::default(), store, codec, transform_config);
//! let summary = runner.run().await?;
//! println!("{} converted, {} skipped, {} failed", summary.converted, summary.skipped, summary.failed);
//! ```

mod config;
mod runner;
mod types;

pub use config::BatchConfig;
pub use runner::BatchRunner;
pub use types::{BatchError, BatchPhase, BatchSummary, ItemError};
