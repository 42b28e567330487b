use thiserror::Error;

/// Centralized error type for satchel-core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid resource id: {0}")]
    InvalidId(String),
    #[error("invalid resource location: {0}")]
    InvalidLocation(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
