pub mod batch;
pub mod codec;
pub mod config;
pub mod metrics;
pub mod storage;
pub mod testing;
pub mod transform;

pub use batch::{BatchConfig, BatchError, BatchPhase, BatchRunner, BatchSummary, ItemError};
pub use codec::{CodecError, ImageCodec, RasterCodec, TargetFormat};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use storage::{
    list_pages, ImagePayload, ObjectDescriptor, ObjectPage, ObjectStore, PageCursor,
    S3ObjectStore, StorageConfig, StorageError,
};
pub use transform::{
    ItemTransformer, NamingPolicy, SkipReason, TransformConfig, TransformError, TransformOutcome,
};
