//! Batch runner implementation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{broadcast, mpsc, watch, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::codec::ImageCodec;
use crate::metrics;
use crate::storage::{list_pages, ObjectDescriptor, ObjectStore, StorageError};
use crate::transform::{ItemTransformer, TransformConfig, TransformError, TransformOutcome};

use super::config::BatchConfig;
use super::types::{BatchError, BatchPhase, BatchSummary};

/// Runs one batch over every object in a store.
///
/// A runner is single-use: [`BatchRunner::run`] consumes it.
pub struct BatchRunner {
    config: BatchConfig,
    store: Arc<dyn ObjectStore>,
    transformer: Arc<ItemTransformer>,
    phase_tx: watch::Sender<BatchPhase>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

/// Shared pool occupancy counters.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        metrics::ITEMS_IN_FLIGHT.inc();
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
        metrics::ITEMS_IN_FLIGHT.dec();
    }
}

/// Why dispatch stopped.
enum ListingEnd {
    Exhausted,
    Failed(StorageError),
    Interrupted,
}

impl BatchRunner {
    /// Creates a runner over `store`, converting with `codec`.
    ///
    /// A concurrency of 0 is treated as 1.
    pub fn new(
        config: BatchConfig,
        store: Arc<dyn ObjectStore>,
        codec: Arc<dyn ImageCodec>,
        transform_config: TransformConfig,
    ) -> Self {
        let transformer = Arc::new(ItemTransformer::new(
            Arc::clone(&store),
            codec,
            transform_config,
        ));
        let (phase_tx, _) = watch::channel(BatchPhase::Listing);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Self {
            config,
            store,
            transformer,
            phase_tx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> BatchPhase {
        *self.phase_tx.borrow()
    }

    /// Receiver that observes phase changes, including after `run` starts.
    pub fn subscribe_phase(&self) -> watch::Receiver<BatchPhase> {
        self.phase_tx.subscribe()
    }

    /// Sender that stops dispatch when signalled.
    ///
    /// Objects already handed to workers still finish and are counted; the
    /// summary is marked `interrupted`.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Lists the store and transforms every object.
    ///
    /// Per-object failures never end the run. Only a listing failure does,
    /// after in-flight objects have been drained.
    pub async fn run(self) -> Result<BatchSummary, BatchError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(self, run_id: Uuid) -> Result<BatchSummary, BatchError> {
        let BatchRunner {
            config,
            store,
            transformer,
            phase_tx,
            shutdown_tx,
            mut shutdown_rx,
        } = self;

        let concurrency = config.concurrency.max(1);
        let mut summary = BatchSummary::new(run_id, Utc::now());
        info!(
            "Starting batch over {} store with {} workers, target {}",
            store.name(),
            concurrency,
            transformer.target()
        );

        let pool = Arc::new(Semaphore::new(concurrency));
        let in_flight = Arc::new(InFlight::default());
        let (outcome_tx, outcome_rx) = mpsc::channel::<TransformOutcome>(concurrency);
        let collector = tokio::spawn(collect_outcomes(outcome_rx).in_current_span());

        let mut cursor = list_pages(store.as_ref());
        let mut dispatched = 0usize;

        let end = 'listing: loop {
            let next = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break 'listing ListingEnd::Interrupted,
                page = cursor.next_page() => page,
            };

            let page = match next {
                None => break 'listing ListingEnd::Exhausted,
                Some(Err(e)) => break 'listing ListingEnd::Failed(e),
                Some(Ok(page)) => page,
            };

            metrics::LISTING_PAGES.inc();
            if *phase_tx.borrow() == BatchPhase::Listing {
                phase_tx.send_replace(BatchPhase::Dispatching);
            }

            for descriptor in page.objects {
                let permit = tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break 'listing ListingEnd::Interrupted,
                    permit = Arc::clone(&pool).acquire_owned() => permit,
                };
                let Ok(permit) = permit else {
                    // The pool is never closed while the runner holds it.
                    break 'listing ListingEnd::Interrupted;
                };

                spawn_item(
                    descriptor,
                    permit,
                    Arc::clone(&transformer),
                    Arc::clone(&in_flight),
                    outcome_tx.clone(),
                );
                dispatched += 1;
            }
        };
        drop(shutdown_tx);

        debug!(
            pages = cursor.pages_fetched(),
            dispatched, "Listing finished, draining workers"
        );
        if !matches!(end, ListingEnd::Failed(_)) {
            phase_tx.send_replace(BatchPhase::Draining);
        }

        // Barrier: the collector ends once every worker has dropped its sender.
        drop(outcome_tx);
        let collected = collector
            .await
            .map_err(|e| BatchError::CollectorFailed(e.to_string()))?;

        summary.converted = collected.converted;
        summary.skipped = collected.skipped;
        summary.failed = collected.failed;
        summary.errors = collected.errors;
        summary.bytes_read = collected.bytes_read;
        summary.bytes_written = collected.bytes_written;
        summary.peak_in_flight = in_flight.peak.load(Ordering::SeqCst);
        summary.finished_at = Utc::now();

        match end {
            ListingEnd::Failed(e) => {
                phase_tx.send_replace(BatchPhase::Aborted);
                error!(
                    "Listing failed after {} objects were dispatched: {}",
                    dispatched, e
                );
                Err(BatchError::StorageUnavailable {
                    reason: e.to_string(),
                    partial: Box::new(summary),
                })
            }
            ListingEnd::Interrupted => {
                summary.interrupted = true;
                phase_tx.send_replace(BatchPhase::Done);
                warn!(
                    "Batch interrupted: {} converted, {} skipped, {} failed before shutdown",
                    summary.converted, summary.skipped, summary.failed
                );
                Ok(summary)
            }
            ListingEnd::Exhausted => {
                phase_tx.send_replace(BatchPhase::Done);
                info!(
                    "Batch finished in {}ms: {} converted, {} skipped, {} failed",
                    summary.duration().num_milliseconds(),
                    summary.converted,
                    summary.skipped,
                    summary.failed
                );
                Ok(summary)
            }
        }
    }
}

/// Spawns one worker. The permit is held until the outcome is delivered.
fn spawn_item(
    descriptor: ObjectDescriptor,
    permit: OwnedSemaphorePermit,
    transformer: Arc<ItemTransformer>,
    in_flight: Arc<InFlight>,
    outcome_tx: mpsc::Sender<TransformOutcome>,
) {
    tokio::spawn(
        async move {
            let _permit = permit;
            in_flight.enter();
            let started = Instant::now();

            let outcome = match AssertUnwindSafe(transformer.process(&descriptor))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let reason = panic_reason(panic.as_ref());
                    error!("Worker panicked on {}: {}", descriptor.key, reason);
                    TransformOutcome::Failed {
                        key: descriptor.key.clone(),
                        error: TransformError::TaskAborted { reason },
                    }
                }
            };

            metrics::record_outcome(&outcome, started.elapsed());
            in_flight.leave();

            if outcome_tx.send(outcome).await.is_err() {
                error!("Outcome collector gone, dropping result for {}", descriptor.key);
            }
        }
        .in_current_span(),
    );
}

/// Aggregates outcomes until every sender is dropped.
async fn collect_outcomes(mut outcome_rx: mpsc::Receiver<TransformOutcome>) -> BatchSummary {
    let mut tally = BatchSummary::new(Uuid::nil(), Utc::now());
    while let Some(outcome) = outcome_rx.recv().await {
        tally.record(outcome);
    }
    tally
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
