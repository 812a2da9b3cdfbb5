//! Trait definitions for the storage module.

use async_trait::async_trait;

use super::error::StorageError;
use super::types::{ImagePayload, ObjectPage};

/// A key-addressed blob store that can be listed, read and written.
///
/// Implementations must be safe to share between concurrent workers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Fetches one listing page.
    ///
    /// `continuation` is `None` for the first page and the token returned by
    /// the previous page afterwards. Errors are reported as
    /// [`StorageError::Unavailable`].
    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage, StorageError>;

    /// Downloads one object.
    async fn get_object(&self, key: &str) -> Result<ImagePayload, StorageError>;

    /// Uploads one object, replacing any existing object under `key`.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
