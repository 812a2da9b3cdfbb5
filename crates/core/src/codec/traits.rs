//! Trait definitions for the codec module.

use image::DynamicImage;

use super::error::CodecError;
use super::types::TargetFormat;

/// Decodes stored image bytes and re-encodes them into one target format.
///
/// Implementations are pure and must be safe to share between workers.
pub trait ImageCodec: Send + Sync {
    /// Format produced by [`ImageCodec::encode`].
    fn target(&self) -> TargetFormat;

    /// Decodes bytes into a pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Encodes a pixel buffer at `quality` (0..=100, higher is larger and closer to the source).
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError>;

    /// Decodes then encodes in one step.
    fn transcode(&self, bytes: &[u8], quality: u8) -> Result<Vec<u8>, CodecError> {
        let image = self.decode(bytes)?;
        self.encode(&image, quality)
    }
}
