//! Error types for the storage module.

use thiserror::Error;

/// Errors that can occur while talking to the object store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Listing failed. Fatal to a batch: a partial listing is not usable.
    #[error("Object store unavailable: {reason}")]
    Unavailable { reason: String },

    /// Reading an object failed.
    #[error("Failed to read object {key}: {reason}")]
    ObjectRead { key: String, reason: String },

    /// Writing an object failed.
    #[error("Failed to write object {key}: {reason}")]
    ObjectWrite { key: String, reason: String },
}

impl StorageError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new object read error.
    pub fn read(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ObjectRead {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new object write error.
    pub fn write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ObjectWrite {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only affects a single object.
    pub fn is_item_level(&self) -> bool {
        matches!(self, Self::ObjectRead { .. } | Self::ObjectWrite { .. })
    }
}
