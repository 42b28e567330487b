//! LRU eviction over the cache directory.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::error::{StoreError, StoreResult};

/// A cache file considered for eviction.
#[derive(Debug)]
pub(crate) struct CacheFile {
    pub(crate) path: PathBuf,
    pub(crate) len: u64,
    pub(crate) last_access: SystemTime,
}

/// List the top-level files of the cache directory with their sizes and
/// last-access times (modified time when the filesystem does not track
/// access times).
pub(crate) fn scan(root: &Path) -> StoreResult<Vec<CacheFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let meta = entry.metadata()?;
        let last_access = meta
            .accessed()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push(CacheFile {
            path: entry.path(),
            len: meta.len(),
            last_access,
        });
    }
    Ok(files)
}

/// Total size of the top-level files of the cache directory.
pub(crate) fn total_size(root: &Path) -> StoreResult<u64> {
    Ok(scan(root)?.iter().map(|f| f.len).sum())
}

/// Delete oldest-accessed files until `incoming` bytes fit inside `budget`.
///
/// The shortfall is `(current + incoming) - budget`; files are removed
/// oldest-accessed-first until at least that many bytes are released. If
/// every candidate is consumed without covering the shortfall the insertion
/// is rejected with [`StoreError::CacheFull`].
///
/// Returns the deleted paths so the caller can drop matching index entries.
pub(crate) fn free_space(
    root: &Path,
    current: u64,
    incoming: u64,
    budget: u64,
) -> StoreResult<Vec<PathBuf>> {
    let required = current + incoming;
    if required <= budget {
        return Ok(Vec::new());
    }

    let shortfall = required - budget;
    let mut files = scan(root)?;
    files.sort_by_key(|f| f.last_access);

    let mut released = 0u64;
    let mut deleted = Vec::new();
    let mut candidates = files.into_iter();

    while released < shortfall {
        let Some(file) = candidates.next() else {
            tracing::warn!(required, budget, "cache full, eviction exhausted");
            return Err(StoreError::CacheFull {
                required: incoming,
                budget,
            });
        };

        released += file.len;
        tracing::debug!(path = %file.path.display(), len = file.len, "evicting cache file");
        fs::remove_file(&file.path)?;
        deleted.push(file.path);
    }

    Ok(deleted)
}
