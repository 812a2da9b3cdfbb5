use super::{types::Config, ConfigError};
use crate::storage::MAX_PAGE_SIZE;

/// Validate configuration
/// Currently validates:
/// - Bucket and region are not empty
/// - Quality is within 0..=100
/// - Worker pool has at least one slot
/// - Page size, when set, is within what the store accepts
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket cannot be empty".to_string(),
        ));
    }

    if config.storage.region.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.region cannot be empty".to_string(),
        ));
    }

    if let Some(page_size) = config.storage.page_size {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "storage.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
    }

    if config.transform.quality > 100 {
        return Err(ConfigError::ValidationError(format!(
            "transform.quality must be between 0 and 100, got {}",
            config.transform.quality
        )));
    }

    if config.batch.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "batch.concurrency cannot be 0".to_string(),
        ));
    }

    Ok(())
}
