//! S3 implementation of the storage gateway.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use super::config::StorageConfig;
use super::error::StorageError;
use super::traits::ObjectStore;
use super::types::{ImagePayload, ObjectDescriptor, ObjectPage};

/// Object store backed by Amazon S3 or an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    config: StorageConfig,
}

impl S3ObjectStore {
    /// Resolves credentials and builds a client for the configured bucket.
    ///
    /// Credential resolution follows the SDK default chain (environment,
    /// shared config/credentials files, instance metadata), restricted to
    /// `config.profile` when one is set.
    pub async fn connect(config: StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            info!("Using custom S3 endpoint {}", endpoint);
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::with_client(Client::from_conf(builder.build()), config)
    }

    /// Wraps an already configured client.
    pub fn with_client(client: Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// The bucket this store reads and writes.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.config.bucket)
            .set_prefix(self.config.prefix.clone())
            .set_max_keys(self.config.page_size)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| StorageError::unavailable(DisplayErrorContext(&e).to_string()))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| ObjectDescriptor {
                    key: key.to_string(),
                    size_bytes: object.size().and_then(|s| u64::try_from(s).ok()),
                })
            })
            .collect();

        let continuation = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            continuation,
        })
    }

    async fn get_object(&self, key: &str) -> Result<ImagePayload, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::read(key, DisplayErrorContext(&e).to_string()))?;

        let content_type = output.content_type().map(str::to_string);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::read(key, e.to_string()))?
            .into_bytes()
            .to_vec();

        debug!(key, bytes = bytes.len(), "Downloaded object");
        Ok(ImagePayload::new(bytes, content_type))
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::write(key, DisplayErrorContext(&e).to_string()))?;

        debug!(key, bytes = size, content_type, "Uploaded object");
        Ok(())
    }
}
