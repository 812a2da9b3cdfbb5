//! Codec adapter for decoding and re-encoding image payloads.
//!
//! This module provides the `ImageCodec` trait and `RasterCodec`, an
//! implementation backed by the `image` crate for decoding plus JPEG/PNG
//! output, and the `webp` crate for lossy WebP output.
//!
//! Codecs are synchronous and CPU-bound. Callers on an async runtime should
//! hand the work to a blocking thread (the item transformer does this).
//!
//! # Example
//!
//! ```ignore
//! use objconv_core::codec::{ImageCodec, RasterCodec, TargetFormat};
//!
//! let codec = RasterCodec::new(TargetFormat::WebP);
//! let image = codec.decode(&png_bytes)?;
//! let webp_bytes = codec.encode(&image, 85)?;
//! ```

mod error;
mod raster;
mod traits;
mod types;

pub use error::CodecError;
pub use raster::RasterCodec;
pub use traits::ImageCodec;
pub use types::TargetFormat;

/// Re-exported so callers and test doubles can name the pixel buffer type.
pub use image::DynamicImage;
