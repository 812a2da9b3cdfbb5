//! In-memory object store for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::storage::{ImagePayload, ObjectDescriptor, ObjectPage, ObjectStore, StorageError};

/// A stored object.
#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory implementation of the ObjectStore trait.
///
/// Keys are listed in lexical order, `page_size` at a time, with the last key
/// of each page as the continuation token. Provides controllable behavior:
/// - Per-key read and write failures
/// - A listing failure on a chosen `list_page` call
/// - Simulated latency on every call
/// - Call counters and peak concurrent reads for assertions
///
/// Clones share state, so a test can keep one handle and give another to the
/// code under test.
///
/// # Example
///
/// ```rust,ignore
/// use objconv_core::testing::MemoryObjectStore;
///
/// let store = MemoryObjectStore::new().with_page_size(2);
/// store.insert("a.png", png_bytes, "image/png").await;
/// store.fail_get_for("a.png").await;
///
/// // ... run a batch ...
///
/// assert_eq!(store.put_count().await, 0);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    page_size: usize,
    failing_gets: Arc<RwLock<HashSet<String>>>,
    failing_puts: Arc<RwLock<HashSet<String>>>,
    /// Zero-based `list_page` call that fails.
    failing_list_call: Arc<RwLock<Option<usize>>>,
    latency: Arc<RwLock<Duration>>,
    list_calls: Arc<AtomicUsize>,
    get_calls: Arc<AtomicUsize>,
    put_calls: Arc<AtomicUsize>,
    gets_in_flight: Arc<AtomicUsize>,
    peak_gets_in_flight: Arc<AtomicUsize>,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    /// Create an empty store with a page size of 1000.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: 1000,
            failing_gets: Arc::new(RwLock::new(HashSet::new())),
            failing_puts: Arc::new(RwLock::new(HashSet::new())),
            failing_list_call: Arc::new(RwLock::new(None)),
            latency: Arc::new(RwLock::new(Duration::ZERO)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            get_calls: Arc::new(AtomicUsize::new(0)),
            put_calls: Arc::new(AtomicUsize::new(0)),
            gets_in_flight: Arc::new(AtomicUsize::new(0)),
            peak_gets_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set how many keys each listing page holds.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store an object directly, bypassing counters.
    pub async fn insert(&self, key: &str, bytes: Vec<u8>, content_type: &str) {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Read an object directly, bypassing counters.
    pub async fn get(&self, key: &str) -> Option<ImagePayload> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| ImagePayload::new(o.bytes.clone(), Some(o.content_type.clone())))
    }

    /// All keys currently stored, in order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Make every read of `key` fail.
    pub async fn fail_get_for(&self, key: &str) {
        self.failing_gets.write().await.insert(key.to_string());
    }

    /// Make every write to `key` fail.
    pub async fn fail_put_for(&self, key: &str) {
        self.failing_puts.write().await.insert(key.to_string());
    }

    /// Make the `call`-th (zero-based) `list_page` call fail.
    pub async fn fail_listing_at_page(&self, call: usize) {
        *self.failing_list_call.write().await = Some(call);
    }

    /// Add a delay to every store call.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Number of `list_page` calls made.
    pub async fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_object` calls made.
    pub async fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `put_object` calls made.
    pub async fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `get_object` calls observed running at once.
    pub async fn peak_concurrent_gets(&self) -> usize {
        self.peak_gets_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage, StorageError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if *self.failing_list_call.read().await == Some(call) {
            return Err(StorageError::unavailable(format!(
                "simulated listing failure on call {}",
                call
            )));
        }

        let objects = self.objects.read().await;
        let lower = match &continuation {
            Some(token) => Bound::Excluded(token.clone()),
            None => Bound::Unbounded,
        };

        let mut page: Vec<ObjectDescriptor> = objects
            .range((lower, Bound::Unbounded))
            .take(self.page_size + 1)
            .map(|(key, object)| ObjectDescriptor {
                key: key.clone(),
                size_bytes: Some(object.bytes.len() as u64),
            })
            .collect();

        let continuation = if page.len() > self.page_size {
            page.truncate(self.page_size);
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects: page,
            continuation,
        })
    }

    async fn get_object(&self, key: &str) -> Result<ImagePayload, StorageError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.gets_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_gets_in_flight.fetch_max(now, Ordering::SeqCst);

        self.simulate_latency().await;
        let result = if self.failing_gets.read().await.contains(key) {
            Err(StorageError::read(key, "simulated read failure"))
        } else {
            self.get(key)
                .await
                .ok_or_else(|| StorageError::read(key, "NoSuchKey"))
        };

        self.gets_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.failing_puts.read().await.contains(key) {
            return Err(StorageError::write(key, "simulated write failure"));
        }

        self.insert(key, bytes, content_type).await;
        Ok(())
    }
}
