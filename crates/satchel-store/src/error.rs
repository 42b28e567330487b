use satchel_core::{RequestStatus, ResourceId};
use thiserror::Error;

/// Centralized error type for satchel-store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("descriptor (de)serialization failed: {0}")]
    Descriptor(#[from] serde_json::Error),
    #[error("resource {id} has no bytes to store")]
    MissingBytes { id: ResourceId },
    #[error("resource {id} is already cached")]
    Duplicate { id: ResourceId },
    #[error("cache full: {required} bytes required, budget is {budget}")]
    CacheFull { required: u64, budget: u64 },
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }

    pub fn is_cache_full(&self) -> bool {
        matches!(self, StoreError::CacheFull { .. })
    }

    /// Classify this failure in protocol terms.
    pub fn request_status(&self) -> RequestStatus {
        match self {
            StoreError::Duplicate { .. } => RequestStatus::DuplicateId,
            StoreError::Io(_)
            | StoreError::Descriptor(_)
            | StoreError::MissingBytes { .. }
            | StoreError::CacheFull { .. } => RequestStatus::Failed,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
