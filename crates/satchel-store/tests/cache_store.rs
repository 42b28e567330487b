use std::time::Duration;

use bytes::Bytes;
use satchel_core::{ResourceId, ResourceMetadata};
use satchel_store::{CacheStore, StoreOptions, StoredEntry};
use url::Url;

fn metadata(name: &str, version: &str) -> ResourceMetadata {
    ResourceMetadata::new(ResourceId::random())
        .with_name(name)
        .with_location(Url::parse("http://cdn.example.com/file").unwrap())
        .with_version(version)
}

fn entry(name: &str, version: &str, len: usize) -> StoredEntry {
    StoredEntry::new(metadata(name, version), "bytes", Bytes::from(vec![b'x'; len]))
}

fn open(root: &std::path::Path, max_bytes: u64) -> CacheStore {
    CacheStore::open(StoreOptions::new(root).with_max_bytes(max_bytes)).unwrap()
}

#[test]
fn add_and_lookup_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), u64::MAX);

    let added = entry("pack", "2021-01-01T00-00-00", 64);
    let id = added.id();
    store.add(added.clone()).unwrap();

    // Warm path: served from the in-process index.
    assert!(store.is_indexed(id));
    let meta = store.try_get_metadata(id).unwrap().unwrap();
    assert_eq!(meta.name, "pack");
    let found = store.try_get_entry(&meta).unwrap().unwrap();
    assert_eq!(found.bytes, added.bytes);
    assert!(found.metadata.last_access_time.is_some());

    // Cold path: a fresh store over the same directory reconstructs from disk.
    let reopened = open(dir.path(), u64::MAX);
    assert!(!reopened.is_indexed(id));
    let meta = reopened.try_get_metadata(id).unwrap().unwrap();
    let found = reopened.try_get_entry(&meta).unwrap().unwrap();
    assert_eq!(found.bytes, added.bytes);
    assert_eq!(found.kind, "bytes");
    assert!(reopened.is_indexed(id));
}

#[test]
fn missing_identity_is_absent_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), u64::MAX);

    assert!(store.try_get_metadata(ResourceId::random()).unwrap().is_none());
}

#[test]
fn duplicate_add_leaves_first_entry_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), u64::MAX);

    let first = entry("original", "2021-01-01T00-00-00", 32);
    let id = first.id();
    store.add(first.clone()).unwrap();

    let mut second = entry("imposter", "2022-01-01T00-00-00", 48);
    second.metadata.id = id;
    let err = store.add(second).unwrap_err();
    assert!(err.is_duplicate());

    let meta = store.try_get_metadata(id).unwrap().unwrap();
    assert_eq!(meta.name, "original");
    let kept = store.try_get_entry(&meta).unwrap().unwrap();
    assert_eq!(kept.bytes.len(), 32);
}

#[test]
fn empty_payload_is_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), u64::MAX);

    let empty = entry("empty", "2021-01-01T00-00-00", 0);
    let id = empty.id();
    assert!(matches!(
        store.add(empty),
        Err(satchel_store::StoreError::MissingBytes { .. })
    ));
    assert!(store.try_get_metadata(id).unwrap().is_none());
}

#[test]
fn eviction_removes_oldest_accessed_entry_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), 24_000);

    let a = entry("a", "2021-01-01T00-00-00", 10_000);
    let b = entry("b", "2021-01-02T00-00-00", 10_000);
    let c = entry("c", "2021-01-03T00-00-00", 8_000);
    let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());

    store.add(a).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    store.add(b).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    store.add(c).unwrap();

    // Oldest entry went; the newer one and the incoming one remain, and the
    // cache is back under budget.
    assert!(!store.is_indexed(a_id));
    assert!(store.total_size().unwrap() <= 24_000);

    let reopened = open(dir.path(), 24_000);
    assert!(reopened.try_get_metadata(a_id).unwrap().is_none());

    let b_meta = reopened.try_get_metadata(b_id).unwrap().unwrap();
    assert!(reopened.try_get_entry(&b_meta).unwrap().is_some());

    let c_meta = reopened.try_get_metadata(c_id).unwrap().unwrap();
    let c_back = reopened.try_get_entry(&c_meta).unwrap().unwrap();
    assert_eq!(c_back.bytes.len(), 8_000);
}

#[test]
fn insert_larger_than_budget_is_rejected_without_partial_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), 1_000);

    let keeper = entry("keeper", "2021-01-01T00-00-00", 400);
    let keeper_id = keeper.id();
    store.add(keeper).unwrap();

    let oversized = entry("oversized", "2021-01-02T00-00-00", 5_000);
    let oversized_id = oversized.id();
    let err = store.add(oversized).unwrap_err();
    assert!(err.is_cache_full());

    // Nothing of the rejected entry was written.
    let reopened = open(dir.path(), 1_000);
    assert!(reopened.try_get_metadata(oversized_id).unwrap().is_none());
    // The keeper may have been sacrificed during eviction, but the rejected
    // insert itself never landed.
    let _ = keeper_id;
}

#[test]
fn orphaned_descriptor_is_healed_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), u64::MAX);

    let stored = entry("orphan", "2021-01-01T00-00-00", 128);
    let id = stored.id();
    store.add(stored).unwrap();

    // Simulate a lost data file in a later session.
    let reopened = open(dir.path(), u64::MAX);
    for file in std::fs::read_dir(dir.path()).unwrap() {
        let path = file.unwrap().path();
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            std::fs::remove_file(path).unwrap();
        }
    }

    let meta = reopened.try_get_metadata(id).unwrap().unwrap();
    assert!(reopened.try_get_entry(&meta).unwrap().is_none());

    // The orphaned descriptor was deleted along the way.
    assert!(reopened.try_get_metadata(id).unwrap().is_none());
}

#[test]
fn refreshed_entry_replaces_stale_files_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let id = ResourceId::random();

    let store = open(dir.path(), u64::MAX);
    let mut stale = entry("old name", "2021-01-01T00-00-00", 100);
    stale.metadata.id = id;
    store.add(stale).unwrap();
    drop(store);

    // A later session downloads the newer version of the same identity.
    let store = open(dir.path(), u64::MAX);
    let mut fresh = StoredEntry::new(
        metadata("new name", "2022-06-01T00-00-00"),
        "text",
        Bytes::from(vec![b'y'; 150]),
    );
    fresh.metadata.id = id;
    store.add(fresh).unwrap();

    let reopened = open(dir.path(), u64::MAX);
    let meta = reopened.try_get_metadata(id).unwrap().unwrap();
    assert_eq!(meta.version.as_str(), "2022-06-01T00-00-00");
    let back = reopened.try_get_entry(&meta).unwrap().unwrap();
    assert_eq!(back.bytes.len(), 150);
    assert_eq!(back.kind, "text");

    // Exactly one descriptor and one data file remain for the identity.
    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|f| f.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(&id.to_string()))
        .collect();
    assert_eq!(files.len(), 2, "expected descriptor + data, got {files:?}");
}
