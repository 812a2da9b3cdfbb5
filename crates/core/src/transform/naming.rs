//! Destination key derivation.

use crate::codec::TargetFormat;

use super::config::NamingPolicy;

/// Replaces the trailing extension of `key` with `extension`.
///
/// Only the final path segment is considered, so `a.b/c` gains an extension
/// instead of losing `b/c`. A key without an extension, or a dotfile such as
/// `.hidden`, gets the extension appended.
pub fn replace_extension(key: &str, extension: &str) -> String {
    let segment_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &key[segment_start..];

    let stem_len = match segment.rfind('.') {
        Some(dot) if dot > 0 => segment_start + dot,
        _ => key.len(),
    };

    format!("{}.{}", &key[..stem_len], extension)
}

/// Key the converted object is written to under `policy`.
pub fn destination_key(key: &str, target: TargetFormat, policy: NamingPolicy) -> String {
    match policy {
        NamingPolicy::Rename => replace_extension(key, target.extension()),
        NamingPolicy::Overwrite => key.to_string(),
    }
}
