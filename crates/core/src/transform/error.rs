//! Error types for the transform module.

use thiserror::Error;

use crate::codec::CodecError;
use crate::storage::StorageError;

/// Reasons a single object could not be converted.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// Download or upload failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Decode or encode failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The worker running the transform panicked or was torn down.
    #[error("Transform task aborted: {reason}")]
    TaskAborted { reason: String },
}

impl TransformError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Storage(StorageError::ObjectRead { .. }) => "read",
            Self::Storage(StorageError::ObjectWrite { .. }) => "write",
            Self::Storage(StorageError::Unavailable { .. }) => "storage",
            Self::Codec(CodecError::UnsupportedFormat { .. }) => "unsupported_format",
            Self::Codec(CodecError::CorruptImage { .. }) => "corrupt_image",
            Self::Codec(CodecError::EncodeFailed { .. }) => "encode",
            Self::TaskAborted { .. } => "aborted",
        }
    }
}
