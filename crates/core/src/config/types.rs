use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::storage::StorageConfig;
use crate::transform::TransformConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}
