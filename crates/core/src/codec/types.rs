//! Types for the codec module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format every eligible object is re-encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Lossy WebP.
    #[default]
    WebP,
    /// Baseline JPEG.
    Jpeg,
    /// Lossless PNG; quality is ignored.
    Png,
}

impl TargetFormat {
    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Every extension that already denotes this format.
    pub fn known_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::WebP => &["webp"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
        }
    }

    /// MIME type written as the object's content type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::WebP => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Whether `key` already ends in one of this format's extensions.
    ///
    /// Purely syntactic and case-insensitive; content is never inspected.
    pub fn matches_key(&self, key: &str) -> bool {
        let lower = key.to_ascii_lowercase();
        self.known_extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WebP => "webp",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        };
        f.write_str(name)
    }
}
