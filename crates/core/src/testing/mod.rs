//! Testing utilities and test doubles for the storage and codec seams.
//!
//! This module provides in-memory implementations of the external service
//! traits, allowing full batch runs without a bucket or a real encoder.
//!
//! # Example
//!
//! ```rust,ignore
//! use objconv_core::testing::{MemoryObjectStore, MockCodec};
//!
//! let store = MemoryObjectStore::new();
//! let codec = MockCodec::new(TargetFormat::WebP);
//!
//! // Configure contents and failures
//! store.insert("a.png", b"png".to_vec(), "image/png").await;
//! store.fail_get_for("broken.png").await;
//!
//! // Hand clones to a BatchRunner...
//! ```

mod memory_store;
mod mock_codec;

pub use memory_store::MemoryObjectStore;
pub use mock_codec::MockCodec;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    /// Encode a small gradient as PNG.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode_gradient(width, height, ImageFormat::Png)
    }

    /// Encode a small gradient as JPEG.
    pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        encode_gradient(width, height, ImageFormat::Jpeg)
    }

    fn encode_gradient(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 96])
        });
        let mut buffer = Cursor::new(Vec::new());
        // Writing an RGB8 buffer to an in-memory cursor cannot fail for PNG or JPEG.
        let _ = DynamicImage::ImageRgb8(image).write_to(&mut buffer, format);
        buffer.into_inner()
    }
}
