//! Item transformer implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::codec::{ImageCodec, TargetFormat};
use crate::storage::{ObjectDescriptor, ObjectStore};

use super::config::TransformConfig;
use super::error::TransformError;
use super::naming::destination_key;
use super::types::{SkipReason, TransformOutcome};

/// Converts one object at a time. Cheap to share between workers.
pub struct ItemTransformer {
    store: Arc<dyn ObjectStore>,
    codec: Arc<dyn ImageCodec>,
    config: TransformConfig,
}

/// Bytes produced by a successful conversion.
struct Converted {
    new_key: String,
    input_bytes: usize,
    output_bytes: usize,
}

impl ItemTransformer {
    /// Creates a transformer.
    ///
    /// The output format is whatever `codec` produces; `config.target_format`
    /// is only consulted to warn about a mismatch.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        codec: Arc<dyn ImageCodec>,
        config: TransformConfig,
    ) -> Self {
        if codec.target() != config.target_format {
            warn!(
                "Codec produces {} but config asks for {}; using {}",
                codec.target(),
                config.target_format,
                codec.target()
            );
        }

        Self {
            store,
            codec,
            config,
        }
    }

    /// Output format.
    pub fn target(&self) -> TargetFormat {
        self.codec.target()
    }

    /// Returns why `key` should be skipped, if it should. Never does I/O.
    pub fn check_eligibility(&self, key: &str) -> Option<SkipReason> {
        if key.ends_with('/') {
            return Some(SkipReason::DirectoryMarker);
        }

        if self.target().matches_key(key) {
            return Some(SkipReason::AlreadyTargetFormat);
        }

        if !self.config.source_extensions.is_empty() {
            let lower = key.to_ascii_lowercase();
            let eligible = self
                .config
                .source_extensions
                .iter()
                .any(|ext| lower.ends_with(&format!(".{}", ext)));
            if !eligible {
                return Some(SkipReason::NotEligibleSource);
            }
        }

        None
    }

    /// Processes one object. Always yields exactly one outcome.
    pub async fn process(&self, descriptor: &ObjectDescriptor) -> TransformOutcome {
        let key = descriptor.key.clone();

        if let Some(reason) = self.check_eligibility(&key) {
            info!("Skipping {}: {}", key, reason);
            return TransformOutcome::Skipped { key, reason };
        }

        match self.convert(&key).await {
            Ok(done) => {
                info!(
                    "Converted {} -> {} ({} -> {} bytes)",
                    key, done.new_key, done.input_bytes, done.output_bytes
                );
                TransformOutcome::Converted {
                    key,
                    new_key: done.new_key,
                    input_bytes: done.input_bytes,
                    output_bytes: done.output_bytes,
                }
            }
            Err(error) => {
                warn!(kind = error.kind(), "Failed to convert {}: {}", key, error);
                TransformOutcome::Failed { key, error }
            }
        }
    }

    /// Download, transcode, upload. The first failing step ends the attempt.
    async fn convert(&self, key: &str) -> Result<Converted, TransformError> {
        let payload = self.store.get_object(key).await?;
        let input_bytes = payload.len();
        debug!(
            key,
            bytes = input_bytes,
            content_type = payload.content_type.as_deref().unwrap_or("unknown"),
            "Fetched source object"
        );

        let codec = Arc::clone(&self.codec);
        let quality = self.config.quality;
        let encoded = tokio::task::spawn_blocking(move || codec.transcode(&payload.bytes, quality))
            .await
            .map_err(|e| TransformError::TaskAborted {
                reason: e.to_string(),
            })??;
        let output_bytes = encoded.len();

        let target = self.target();
        let new_key = destination_key(key, target, self.config.naming);
        self.store
            .put_object(&new_key, encoded, target.mime_type())
            .await?;

        Ok(Converted {
            new_key,
            input_bytes,
            output_bytes,
        })
    }
}
