//! Deterministic file naming for cache entries.

use std::{
    fs,
    path::{Path, PathBuf},
};

use satchel_core::ResourceId;

use crate::error::StoreResult;

/// Hyphenated UUID length, the prefix of every cache file name.
const ID_LEN: usize = 36;

/// Strip a human-readable name down to its alphanumeric characters.
pub fn sanitize_name(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Descriptor file name for `id`.
pub(crate) fn descriptor_file_name(id: ResourceId) -> String {
    format!("{id}.json")
}

/// Data file name for `id`: `<id>-<kind>[-<sanitized-name>]`.
pub(crate) fn data_file_name(id: ResourceId, kind: &str, name: &str) -> String {
    let sanitized = sanitize_name(name);
    if sanitized.is_empty() {
        format!("{id}-{kind}")
    } else {
        format!("{id}-{kind}-{sanitized}")
    }
}

/// Recover the identity prefix of a cache file name, descriptor or data.
pub(crate) fn parse_file_id(file_name: &str) -> Option<ResourceId> {
    file_name.get(..ID_LEN)?.parse().ok()
}

/// Recover the kind segment of a data file name.
pub(crate) fn parse_file_kind(file_name: &str) -> Option<&str> {
    let rest = file_name.get(ID_LEN..)?.strip_prefix('-')?;
    Some(rest.split('-').next().unwrap_or(rest))
}

/// Locate the data file for `id`, if any.
///
/// Scans the top level of `root` for a file named `<id>-...`; the descriptor
/// (`<id>.json`) never matches.
pub(crate) fn find_data_file(root: &Path, id: ResourceId) -> StoreResult<Option<PathBuf>> {
    let prefix = format!("{id}-");
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(&prefix) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}
