//! Configuration for the item transformer.

use serde::{Deserialize, Serialize};

use crate::codec::TargetFormat;

/// Where the converted bytes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Write to a new key with the target extension, leaving the source in place.
    #[default]
    Rename,
    /// Replace the source object under its own key.
    Overwrite,
}

/// Configuration for converting a single object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Format every eligible object is converted to.
    #[serde(default)]
    pub target_format: TargetFormat,

    /// Encoder quality, 0..=100.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Destination key policy.
    #[serde(default)]
    pub naming: NamingPolicy,

    /// Source extensions to convert (lowercase, no dot). Empty means every key.
    #[serde(default)]
    pub source_extensions: Vec<String>,
}

fn default_quality() -> u8 {
    85
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            target_format: TargetFormat::default(),
            quality: default_quality(),
            naming: NamingPolicy::default(),
            source_extensions: Vec::new(),
        }
    }
}

impl TransformConfig {
    /// Sets the target format.
    pub fn with_target(mut self, target: TargetFormat) -> Self {
        self.target_format = target;
        self
    }

    /// Sets the encoder quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the naming policy.
    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    /// Restricts conversion to keys with these extensions.
    pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }
}
