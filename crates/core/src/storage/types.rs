//! Types for the storage module.

use serde::{Deserialize, Serialize};

/// One stored object, as seen by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Object key within the bucket.
    pub key: String,
    /// Size reported by the listing, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl ObjectDescriptor {
    /// Creates a descriptor with no size information.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
        }
    }
}

/// A single page of a listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// Objects on this page, in store order.
    pub objects: Vec<ObjectDescriptor>,
    /// Opaque token for the next page. `None` on the last page.
    pub continuation: Option<String>,
}

impl ObjectPage {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

/// Raw bytes of one stored object.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Content type reported by the store.
    pub content_type: Option<String>,
}

impl ImagePayload {
    /// Creates a payload from bytes and a content type.
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
