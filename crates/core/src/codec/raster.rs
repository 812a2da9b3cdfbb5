//! Raster codec backed by the `image` and `webp` crates.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use super::error::CodecError;
use super::traits::ImageCodec;
use super::types::TargetFormat;

/// Codec for common raster formats.
///
/// Decodes anything the `image` crate has a decoder for. Encodes WebP lossily
/// through libwebp, JPEG through the `image` encoder and PNG losslessly.
#[derive(Debug, Clone, Copy)]
pub struct RasterCodec {
    target: TargetFormat,
}

impl RasterCodec {
    /// Creates a codec producing `target`.
    pub fn new(target: TargetFormat) -> Self {
        Self { target }
    }

    fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        // libwebp only takes 8-bit RGB or RGBA.
        let converted;
        let source = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other => {
                converted = if other.color().has_alpha() {
                    DynamicImage::ImageRgba8(other.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(other.to_rgb8())
                };
                &converted
            }
        };

        let encoder = webp::Encoder::from_image(source)
            .map_err(|e| CodecError::encode_failed(e.to_string()))?;
        Ok(encoder.encode(f32::from(quality)).to_vec())
    }

    fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        // JPEG has no alpha channel and the encoder rejects quality 0.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)?;
        Ok(buffer)
    }

    fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

impl ImageCodec for RasterCodec {
    fn target(&self) -> TargetFormat {
        self.target
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        let format = image::guess_format(bytes)
            .map_err(|_| CodecError::unsupported("unrecognized image signature"))?;
        image::load_from_memory_with_format(bytes, format).map_err(CodecError::from)
    }

    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let quality = quality.min(100);
        match self.target {
            TargetFormat::WebP => Self::encode_webp(image, quality),
            TargetFormat::Jpeg => Self::encode_jpeg(image, quality),
            TargetFormat::Png => Self::encode_png(image),
        }
    }
}
