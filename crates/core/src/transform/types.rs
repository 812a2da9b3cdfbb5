//! Types for the transform module.

use std::fmt;

use super::error::TransformError;

/// Why an object was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The key already carries the target extension.
    AlreadyTargetFormat,
    /// The key's extension is not in the configured source list.
    NotEligibleSource,
    /// The key is a folder placeholder (`prefix/`).
    DirectoryMarker,
}

impl SkipReason {
    /// Short label used for metrics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyTargetFormat => "already target format",
            Self::NotEligibleSource => "not an eligible source",
            Self::DirectoryMarker => "directory marker",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of processing one object.
#[derive(Debug, Clone)]
pub enum TransformOutcome {
    /// Converted and written to `new_key`.
    Converted {
        key: String,
        new_key: String,
        input_bytes: usize,
        output_bytes: usize,
    },
    /// Left untouched.
    Skipped { key: String, reason: SkipReason },
    /// Failed at some step; nothing else about the batch is affected.
    Failed { key: String, error: TransformError },
}

impl TransformOutcome {
    /// Source key this outcome belongs to.
    pub fn key(&self) -> &str {
        match self {
            Self::Converted { key, .. } | Self::Skipped { key, .. } | Self::Failed { key, .. } => {
                key
            }
        }
    }

    /// Label used for metrics (`converted`, `skipped`, `failed`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Converted { .. } => "converted",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
