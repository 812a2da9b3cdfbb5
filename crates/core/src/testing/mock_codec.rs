//! Mock codec for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::DynamicImage;

use crate::codec::{CodecError, ImageCodec, TargetFormat};

/// Mock implementation of the ImageCodec trait.
///
/// Decoding returns a 1x1 pixel buffer for any input not registered as
/// failing. Encoding returns a small marker (`"<format>:q<quality>"`) so tests
/// can tell converted objects from originals without a real encoder.
///
/// # Example
///
/// ```rust,ignore
/// use objconv_core::testing::MockCodec;
///
/// let codec = MockCodec::new(TargetFormat::WebP);
/// codec.fail_decode_of(b"garbage", CodecError::corrupt("bad header"));
///
/// // ... run a batch ...
///
/// assert_eq!(codec.encode_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockCodec {
    target: TargetFormat,
    /// Decode failures keyed by the exact input bytes.
    decode_failures: Arc<Mutex<HashMap<Vec<u8>, CodecError>>>,
    decode_calls: Arc<AtomicUsize>,
    encode_calls: Arc<AtomicUsize>,
    qualities: Arc<Mutex<Vec<u8>>>,
}

impl MockCodec {
    /// Create a mock codec producing `target`.
    pub fn new(target: TargetFormat) -> Self {
        Self {
            target,
            decode_failures: Arc::new(Mutex::new(HashMap::new())),
            decode_calls: Arc::new(AtomicUsize::new(0)),
            encode_calls: Arc::new(AtomicUsize::new(0)),
            qualities: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make decoding of exactly `bytes` fail with `error`.
    pub fn fail_decode_of(&self, bytes: &[u8], error: CodecError) {
        if let Ok(mut failures) = self.decode_failures.lock() {
            failures.insert(bytes.to_vec(), error);
        }
    }

    /// Number of `decode` calls made.
    pub fn decode_count(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }

    /// Number of `encode` calls made.
    pub fn encode_count(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }

    /// Quality passed to each `encode` call, in call order.
    pub fn qualities_seen(&self) -> Vec<u8> {
        self.qualities.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// Bytes `encode` produces at `quality`.
    pub fn encoded_marker(&self, quality: u8) -> Vec<u8> {
        format!("{}:q{}", self.target, quality).into_bytes()
    }
}

impl ImageCodec for MockCodec {
    fn target(&self) -> TargetFormat {
        self.target
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .decode_failures
            .lock()
            .ok()
            .and_then(|failures| failures.get(bytes).cloned());
        match failure {
            Some(err) => Err(err),
            None => Ok(DynamicImage::new_rgb8(1, 1)),
        }
    }

    fn encode(&self, _image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut qualities) = self.qualities.lock() {
            qualities.push(quality);
        }
        Ok(self.encoded_marker(quality))
    }
}
