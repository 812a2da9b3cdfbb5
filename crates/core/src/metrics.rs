//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Item outcomes and per-item duration
//! - Bytes moved to and from the object store
//! - Worker pool occupancy and listing progress

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

use crate::transform::TransformOutcome;

// =============================================================================
// Item Metrics
// =============================================================================

/// Items processed by outcome.
pub static ITEMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("objconv_items_total", "Total objects processed"),
        &["outcome"], // "converted", "skipped", "failed"
    )
    .unwrap()
});

/// Per-item processing time in seconds.
pub static ITEM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "objconv_item_duration_seconds",
            "Time from dispatch to outcome for one object",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Failures by kind.
pub static ITEM_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("objconv_item_failures_total", "Failed objects by error kind"),
        &["kind"], // "read", "write", "unsupported_format", "corrupt_image", ...
    )
    .unwrap()
});

/// Bytes downloaded and uploaded.
pub static BYTES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("objconv_bytes_total", "Bytes transferred for converted objects"),
        &["direction"], // "read", "written"
    )
    .unwrap()
});

// =============================================================================
// Pool Metrics
// =============================================================================

/// Items currently being transformed.
pub static ITEMS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "objconv_items_in_flight",
        "Objects currently held by a worker",
    )
    .unwrap()
});

/// Listing pages fetched.
pub static LISTING_PAGES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("objconv_listing_pages_total", "Listing pages fetched").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one finished item.
pub fn record_outcome(outcome: &TransformOutcome, elapsed: Duration) {
    let label = outcome.label();
    ITEMS_TOTAL.with_label_values(&[label]).inc();
    ITEM_DURATION
        .with_label_values(&[label])
        .observe(elapsed.as_secs_f64());

    match outcome {
        TransformOutcome::Converted {
            input_bytes,
            output_bytes,
            ..
        } => {
            BYTES_TOTAL
                .with_label_values(&["read"])
                .inc_by(*input_bytes as u64);
            BYTES_TOTAL
                .with_label_values(&["written"])
                .inc_by(*output_bytes as u64);
        }
        TransformOutcome::Failed { error, .. } => {
            ITEM_FAILURES.with_label_values(&[error.kind()]).inc();
        }
        TransformOutcome::Skipped { .. } => {}
    }
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ITEMS_TOTAL.clone()),
        Box::new(ITEM_DURATION.clone()),
        Box::new(ITEM_FAILURES.clone()),
        Box::new(BYTES_TOTAL.clone()),
        Box::new(ITEMS_IN_FLIGHT.clone()),
        Box::new(LISTING_PAGES.clone()),
    ]
}
