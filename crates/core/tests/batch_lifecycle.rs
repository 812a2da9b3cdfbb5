//! Batch lifecycle integration tests.
//!
//! These tests drive the batch runner against the in-memory store:
//! - Mixed bucket scenario and summary counts
//! - Repeat runs under both naming policies
//! - Fault isolation for read, decode and write failures
//! - Worker pool bound and multi-page listings
//! - Fatal listing failures and cooperative shutdown

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use objconv_core::{
    codec::CodecError,
    testing::{fixtures, MemoryObjectStore, MockCodec},
    BatchConfig, BatchError, BatchPhase, BatchRunner, ImagePayload, NamingPolicy, ObjectPage,
    ObjectStore, RasterCodec, StorageError, TargetFormat, TransformConfig,
};

/// Test helper wiring a runner to shared store and codec handles.
struct TestHarness {
    store: MemoryObjectStore,
    codec: MockCodec,
    batch: BatchConfig,
    transform: TransformConfig,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            store: MemoryObjectStore::new(),
            codec: MockCodec::new(TargetFormat::WebP),
            batch: BatchConfig::default(),
            transform: TransformConfig::default(),
        }
    }

    fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.transform = self.transform.with_naming(naming);
        self
    }

    fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.batch = self.batch.with_concurrency(concurrency);
        self
    }

    fn with_page_size(mut self, page_size: usize) -> Self {
        self.store = self.store.with_page_size(page_size);
        self
    }

    async fn put(&self, key: &str) {
        let content_type = if key.ends_with(".webp") {
            "image/webp"
        } else {
            "image/png"
        };
        self.store
            .insert(key, format!("source:{}", key).into_bytes(), content_type)
            .await;
    }

    fn runner(&self) -> BatchRunner {
        BatchRunner::new(
            self.batch.clone(),
            Arc::new(self.store.clone()),
            Arc::new(self.codec.clone()),
            self.transform.clone(),
        )
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[tokio::test]
async fn test_mixed_bucket_rename_policy() {
    let harness = TestHarness::new();
    for key in ["a.png", "b.webp", "c.jpg"] {
        harness.put(key).await;
    }

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.errors.is_empty());

    assert_eq!(
        harness.store.keys().await,
        vec!["a.png", "a.webp", "b.webp", "c.jpg", "c.webp"]
    );

    let original = harness.store.get("a.png").await.unwrap();
    assert_eq!(original.bytes, b"source:a.png");
    let converted = harness.store.get("c.webp").await.unwrap();
    assert_eq!(converted.content_type.as_deref(), Some("image/webp"));
    assert_eq!(converted.bytes, harness.codec.encoded_marker(85));
}

#[tokio::test]
async fn test_phase_reaches_done() {
    let harness = TestHarness::new();
    harness.put("a.png").await;

    let runner = harness.runner();
    let phase = runner.subscribe_phase();
    assert_eq!(*phase.borrow(), BatchPhase::Listing);

    runner.run().await.unwrap();
    assert_eq!(*phase.borrow(), BatchPhase::Done);
}

// =============================================================================
// Idempotence Tests
// =============================================================================

#[tokio::test]
async fn test_rename_policy_second_run_leaves_identical_state() {
    let harness = TestHarness::new();
    for key in ["a.png", "b.webp", "c.jpg"] {
        harness.put(key).await;
    }

    harness.runner().run().await.unwrap();
    let keys_after_first = harness.store.keys().await;
    let puts_after_first = harness.store.put_count().await;

    let second = harness.runner().run().await.unwrap();

    // Sources keep their extension, so they are rewritten to the same keys.
    assert_eq!(second.converted, 2);
    assert_eq!(second.skipped, 3);
    assert_eq!(harness.store.keys().await, keys_after_first);
    assert_eq!(
        harness.store.get("a.webp").await.unwrap().bytes,
        harness.codec.encoded_marker(85)
    );
    assert_eq!(harness.store.put_count().await, puts_after_first + 2);
}

#[tokio::test]
async fn test_rename_policy_bucket_of_targets_is_untouched() {
    let harness = TestHarness::new();
    for key in ["a.webp", "b.webp", "nested/C.WEBP"] {
        harness.put(key).await;
    }

    for _ in 0..2 {
        let summary = harness.runner().run().await.unwrap();
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.converted, 0);
    }

    assert_eq!(harness.store.get_count().await, 0);
    assert_eq!(harness.store.put_count().await, 0);
    assert_eq!(harness.codec.decode_count(), 0);
}

#[tokio::test]
async fn test_overwrite_policy_retranscodes_every_run() {
    let harness = TestHarness::new().with_naming(NamingPolicy::Overwrite);
    for key in ["a.png", "c.jpg"] {
        harness.put(key).await;
    }

    let first = harness.runner().run().await.unwrap();
    let second = harness.runner().run().await.unwrap();

    assert_eq!(first.converted, 2);
    assert_eq!(second.converted, 2);
    assert_eq!(harness.store.keys().await, vec!["a.png", "c.jpg"]);
    assert_eq!(harness.codec.encode_count(), 4);

    let replaced = harness.store.get("a.png").await.unwrap();
    assert_eq!(replaced.content_type.as_deref(), Some("image/webp"));
    assert_eq!(replaced.bytes, harness.codec.encoded_marker(85));
}

// =============================================================================
// Fault Isolation Tests
// =============================================================================

#[tokio::test]
async fn test_read_failure_is_isolated() {
    let harness = TestHarness::new();
    for i in 0..10 {
        harness.put(&format!("img-{:02}.png", i)).await;
    }
    harness.store.fail_get_for("img-04.png").await;

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 9);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].key, "img-04.png");
    assert_eq!(summary.errors[0].kind, "read");
    assert!(harness.store.get("img-04.webp").await.is_none());
}

#[tokio::test]
async fn test_decode_failure_is_isolated() {
    let harness = TestHarness::new();
    for key in ["a.png", "b.png", "c.png"] {
        harness.put(key).await;
    }
    harness
        .codec
        .fail_decode_of(b"source:b.png", CodecError::corrupt("truncated"));

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].key, "b.png");
    assert_eq!(summary.errors[0].kind, "corrupt_image");
}

#[tokio::test]
async fn test_write_failure_is_isolated() {
    let harness = TestHarness::new();
    for key in ["a.png", "b.png", "c.png"] {
        harness.put(key).await;
    }
    harness.store.fail_put_for("c.webp").await;

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].kind, "write");
}

/// Store whose reads panic for one key.
struct PanickingStore {
    inner: MemoryObjectStore,
    poisoned_key: String,
}

#[async_trait]
impl ObjectStore for PanickingStore {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage, StorageError> {
        self.inner.list_page(continuation).await
    }

    async fn get_object(&self, key: &str) -> Result<ImagePayload, StorageError> {
        if key == self.poisoned_key {
            panic!("simulated crash reading {}", key);
        }
        self.inner.get_object(key).await
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.inner.put_object(key, bytes, content_type).await
    }
}

#[tokio::test]
async fn test_worker_panic_becomes_failed_outcome() {
    let inner = MemoryObjectStore::new();
    for key in ["a.png", "b.png", "c.png"] {
        inner.insert(key, b"x".to_vec(), "image/png").await;
    }
    let store = PanickingStore {
        inner: inner.clone(),
        poisoned_key: "b.png".to_string(),
    };

    let runner = BatchRunner::new(
        BatchConfig::default(),
        Arc::new(store),
        Arc::new(MockCodec::new(TargetFormat::WebP)),
        TransformConfig::default(),
    );
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].key, "b.png");
    assert_eq!(summary.errors[0].kind, "aborted");
    assert!(summary.errors[0].message.contains("simulated crash"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test]
async fn test_pool_bound_is_respected() {
    let harness = TestHarness::new().with_concurrency(3);
    for i in 0..20 {
        harness.put(&format!("img-{:02}.png", i)).await;
    }
    harness.store.set_latency(Duration::from_millis(20)).await;

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 20);
    assert!(summary.peak_in_flight <= 3, "peak was {}", summary.peak_in_flight);
    assert!(harness.store.peak_concurrent_gets().await <= 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_is_actually_used_concurrently() {
    let harness = TestHarness::new().with_concurrency(4);
    for i in 0..16 {
        harness.put(&format!("img-{:02}.png", i)).await;
    }
    harness.store.set_latency(Duration::from_millis(50)).await;

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 16);
    assert!(summary.peak_in_flight > 1);
    assert!(summary.peak_in_flight <= 4);
}

#[tokio::test]
async fn test_multi_page_listing_is_fully_enumerated() {
    let harness = TestHarness::new()
        .with_page_size(3)
        .with_naming(NamingPolicy::Overwrite);
    for i in 0..10 {
        harness.put(&format!("img-{:02}.png", i)).await;
    }

    let summary = harness.runner().run().await.unwrap();

    assert_eq!(summary.converted, 10);
    assert_eq!(harness.store.list_count().await, 4);
}

// =============================================================================
// Fatal Error & Shutdown Tests
// =============================================================================

#[tokio::test]
async fn test_first_page_failure_aborts() {
    let harness = TestHarness::new();
    harness.put("a.png").await;
    harness.store.fail_listing_at_page(0).await;

    let runner = harness.runner();
    let phase = runner.subscribe_phase();
    let err = runner.run().await.unwrap_err();

    match err {
        BatchError::StorageUnavailable { partial, .. } => assert_eq!(partial.total(), 0),
        other => panic!("expected storage failure, got {:?}", other),
    }
    assert_eq!(*phase.borrow(), BatchPhase::Aborted);
    assert_eq!(harness.store.get_count().await, 0);
}

#[tokio::test]
async fn test_later_page_failure_drains_in_flight_work() {
    let harness = TestHarness::new()
        .with_page_size(2)
        .with_naming(NamingPolicy::Overwrite);
    for key in ["a.png", "b.png", "c.png", "d.png", "e.png"] {
        harness.put(key).await;
    }
    harness.store.fail_listing_at_page(1).await;

    let err = harness.runner().run().await.unwrap_err();

    match err {
        BatchError::StorageUnavailable { partial, reason } => {
            // The first page was dispatched and every item finished.
            assert_eq!(partial.converted, 2);
            assert!(reason.contains("simulated listing failure"));
        }
        other => panic!("expected storage failure, got {:?}", other),
    }
    assert_eq!(harness.store.put_count().await, 2);
}

#[tokio::test]
async fn test_shutdown_mid_run_finishes_in_flight_items() {
    let harness = TestHarness::new()
        .with_concurrency(2)
        .with_naming(NamingPolicy::Overwrite);
    for i in 0..50 {
        harness.put(&format!("img-{:02}.png", i)).await;
    }
    harness.store.set_latency(Duration::from_millis(20)).await;

    let runner = harness.runner();
    let shutdown = runner.shutdown_handle();
    let handle = tokio::spawn(runner.run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.send(()).unwrap();

    let summary = handle.await.unwrap().unwrap();
    assert!(summary.interrupted);
    assert!(summary.total() < 50);
    // Every object that was fetched reached an outcome.
    assert_eq!(summary.total(), harness.store.get_count().await);
}

// =============================================================================
// Real Codec
// =============================================================================

#[tokio::test]
async fn test_real_codec_produces_webp() {
    let store = MemoryObjectStore::new();
    store.insert("a.png", fixtures::png_bytes(16, 16), "image/png").await;
    store.insert("c.jpg", fixtures::jpeg_bytes(16, 16), "image/jpeg").await;
    store.insert("notes.txt", b"not an image".to_vec(), "text/plain").await;

    let runner = BatchRunner::new(
        BatchConfig::default(),
        Arc::new(store.clone()),
        Arc::new(RasterCodec::new(TargetFormat::WebP)),
        TransformConfig::default().with_quality(75),
    );
    let summary = runner.run().await.unwrap();

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].key, "notes.txt");
    assert_eq!(summary.errors[0].kind, "unsupported_format");

    let webp = store.get("a.webp").await.unwrap();
    assert_eq!(&webp.bytes[0..4], b"RIFF");
    assert_eq!(&webp.bytes[8..12], b"WEBP");
}
