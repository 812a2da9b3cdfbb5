//! Configuration for the storage gateway.

use serde::{Deserialize, Serialize};

/// Largest page the S3 listing API will return.
pub const MAX_PAGE_SIZE: i32 = 1000;

/// Connection settings for the bucket being processed.
///
/// Credentials are never stored here. They are resolved by the AWS SDK
/// default chain, optionally narrowed to a named `profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket name.
    pub bucket: String,

    /// Region the bucket lives in.
    pub region: String,

    /// Shared-config profile used to resolve credentials.
    #[serde(default)]
    pub profile: Option<String>,

    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack, ...).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Only keys under this prefix are listed.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Keys requested per listing round trip. The store default is used when unset.
    #[serde(default)]
    pub page_size: Option<i32>,
}

impl StorageConfig {
    /// Creates a config for a bucket in a region, everything else default.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            profile: None,
            endpoint_url: None,
            prefix: None,
            page_size: None,
        }
    }

    /// Sets the credentials profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Sets a custom endpoint URL.
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Restricts listing to a key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}
