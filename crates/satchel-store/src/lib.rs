#![forbid(unsafe_code)]

//! # satchel-store
//!
//! Size-bounded, file-backed persistent cache of resource (metadata, bytes)
//! pairs keyed by identity, with LRU eviction.
//!
//! ## Disk mapping (normative)
//!
//! Per identity the cache directory holds exactly one descriptor file and one
//! data file:
//!
//! - `<id>.json` — the serialized [`satchel_core::ResourceMetadata`]
//! - `<id>-<kind>[-<sanitized-name>]` — the raw payload bytes
//!
//! `sanitized-name` is the human-readable resource name stripped to
//! alphanumeric characters, kept so cache entries stay inspectable.
//!
//! The store also keeps an in-process index mirroring what is durably stored,
//! so repeated lookups within a session avoid redundant disk reads. In-memory
//! resource values are transient views over the store's entries.

mod error;
mod evict;
mod layout;
mod store;

pub use error::{StoreError, StoreResult};
pub use layout::sanitize_name;
pub use store::{CacheStore, StoreOptions, StoredEntry, DEFAULT_MAX_BYTES};
