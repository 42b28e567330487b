use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::SystemTime,
};

use bytes::Bytes;
use satchel_core::{ResourceId, ResourceMetadata};

use crate::{
    error::{StoreError, StoreResult},
    evict, layout,
};

/// Default cache budget: 2.5 GiB.
pub const DEFAULT_MAX_BYTES: u64 = 2500 << 20;

/// Configuration for [`CacheStore`].
#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// Directory holding descriptor and data files.
    pub root: PathBuf,
    /// Hard budget for the summed size of all cache files.
    pub max_bytes: u64,
}

impl StoreOptions {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// A persisted resource: descriptor, declared kind, and payload bytes.
///
/// The store owns the canonical copy; resource values handed to callers are
/// transient views over entries.
#[derive(Clone, Debug)]
pub struct StoredEntry {
    pub metadata: ResourceMetadata,
    /// Payload kind tag, embedded in the data file name (`bytes`, `text`, ...).
    pub kind: String,
    pub bytes: Bytes,
}

impl StoredEntry {
    pub fn new(metadata: ResourceMetadata, kind: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            metadata,
            kind: kind.into(),
            bytes,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.metadata.id
    }
}

/// File-backed resource cache bounded by a byte budget.
///
/// Process-local and single-writer-assumed: concurrent use within the process
/// serializes on the store's own lock, and no other process is expected to
/// mutate the cache directory.
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
    max_bytes: u64,
    index: Mutex<HashMap<ResourceId, StoredEntry>>,
}

impl CacheStore {
    /// Open (and create if needed) the cache directory.
    pub fn open(options: StoreOptions) -> StoreResult<Self> {
        fs::create_dir_all(&options.root)?;
        Ok(Self {
            root: options.root,
            max_bytes: options.max_bytes,
            index: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Read the descriptor for `id` if one is persisted. Absence is not an
    /// error. The returned metadata is stamped with the current access time.
    pub fn try_get_metadata(&self, id: ResourceId) -> StoreResult<Option<ResourceMetadata>> {
        let path = self.descriptor_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let mut metadata: ResourceMetadata = serde_json::from_str(&json)?;
        metadata.last_access_time = Some(SystemTime::now());
        Ok(Some(metadata))
    }

    /// Fetch the cached entry described by `metadata`.
    ///
    /// Checks the in-process index first, then disk. A descriptor without a
    /// matching data file is an orphan: it is deleted and the lookup reports
    /// absent, healing the metadata/bytes pairing lazily.
    pub fn try_get_entry(&self, metadata: &ResourceMetadata) -> StoreResult<Option<StoredEntry>> {
        let id = metadata.id;

        if let Some(entry) = self.index.lock().expect("store index poisoned").get_mut(&id) {
            entry.metadata.last_access_time = Some(SystemTime::now());
            return Ok(Some(entry.clone()));
        }

        let Some(data_path) = layout::find_data_file(&self.root, id)? else {
            let descriptor = self.descriptor_path(id);
            if descriptor.exists() {
                tracing::warn!(
                    name = %metadata.name,
                    %id,
                    "resource data missing, deleting orphaned descriptor"
                );
                fs::remove_file(descriptor)?;
            }
            return Ok(None);
        };

        let bytes = Bytes::from(fs::read(&data_path)?);
        let kind = data_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(layout::parse_file_kind)
            .unwrap_or("bytes")
            .to_string();

        let mut stamped = metadata.clone();
        stamped.last_access_time = Some(SystemTime::now());
        let entry = StoredEntry::new(stamped, kind, bytes);

        self.index
            .lock()
            .expect("store index poisoned")
            .insert(id, entry.clone());
        Ok(Some(entry))
    }

    /// Persist `entry`, evicting least-recently-accessed files first when the
    /// insertion would exceed the budget.
    ///
    /// # Errors
    ///
    /// - [`StoreError::MissingBytes`] — empty payloads are not stored.
    /// - [`StoreError::Duplicate`] — the identity is already indexed this
    ///   session; the existing entry is left untouched.
    /// - [`StoreError::CacheFull`] — eviction could not release enough space;
    ///   nothing is written.
    pub fn add(&self, entry: StoredEntry) -> StoreResult<()> {
        let id = entry.id();

        if entry.bytes.is_empty() {
            tracing::warn!(%id, "attempt to add resource without bytes");
            return Err(StoreError::MissingBytes { id });
        }

        if self.index.lock().expect("store index poisoned").contains_key(&id) {
            tracing::warn!(%id, "attempt to add duplicate resource");
            return Err(StoreError::Duplicate { id });
        }

        let incoming = entry.bytes.len() as u64;
        let current = evict::total_size(&self.root)?;
        if current + incoming > self.max_bytes {
            let deleted = evict::free_space(&self.root, current, incoming, self.max_bytes)?;
            self.forget_files(&deleted);
        }

        // A descriptor may survive on disk from an earlier session (stale
        // entry being refreshed); replace both files so exactly one canonical
        // entry remains.
        self.remove_files(id)?;

        let descriptor = serde_json::to_string_pretty(&entry.metadata)?;
        fs::write(self.descriptor_path(id), descriptor)?;

        let data_name = layout::data_file_name(id, &entry.kind, &entry.metadata.name);
        fs::write(self.root.join(data_name), &entry.bytes)?;

        self.index
            .lock()
            .expect("store index poisoned")
            .insert(id, entry);
        Ok(())
    }

    /// Summed size of all cache files.
    pub fn total_size(&self) -> StoreResult<u64> {
        evict::total_size(&self.root)
    }

    /// True when `id` is present in the in-process index.
    pub fn is_indexed(&self, id: ResourceId) -> bool {
        self.index
            .lock()
            .expect("store index poisoned")
            .contains_key(&id)
    }

    fn descriptor_path(&self, id: ResourceId) -> PathBuf {
        self.root.join(layout::descriptor_file_name(id))
    }

    /// Remove any persisted files for `id`, descriptor and data alike.
    fn remove_files(&self, id: ResourceId) -> StoreResult<()> {
        let descriptor = self.descriptor_path(id);
        if descriptor.exists() {
            fs::remove_file(descriptor)?;
        }
        while let Some(data) = layout::find_data_file(&self.root, id)? {
            fs::remove_file(data)?;
        }
        Ok(())
    }

    /// Drop index entries whose backing files were evicted.
    fn forget_files(&self, deleted: &[PathBuf]) {
        let mut index = self.index.lock().expect("store index poisoned");
        for path in deleted {
            let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(layout::parse_file_id)
            else {
                continue;
            };
            index.remove(&id);
        }
    }
}
