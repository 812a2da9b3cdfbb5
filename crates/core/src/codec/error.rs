//! Error types for the codec module.

use thiserror::Error;

/// Errors that can occur while decoding or encoding an image.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The bytes are not in any format the decoder understands.
    #[error("Unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    /// The format was recognized but the data is damaged or truncated.
    #[error("Corrupt image: {reason}")]
    CorruptImage { reason: String },

    /// The encoder rejected the pixel buffer.
    #[error("Encoding failed: {reason}")]
    EncodeFailed { reason: String },
}

impl CodecError {
    /// Creates a new unsupported format error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    /// Creates a new corrupt image error.
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptImage {
            reason: reason.into(),
        }
    }

    /// Creates a new encode failed error.
    pub fn encode_failed(reason: impl Into<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
        }
    }
}

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Self::unsupported(e.to_string()),
            image::ImageError::Encoding(e) => Self::encode_failed(e.to_string()),
            other => Self::corrupt(other.to_string()),
        }
    }
}
