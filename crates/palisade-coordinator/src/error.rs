//! Coordinator error types

use palisade_cache::CacheError;
use palisade_directory::DirectoryError;
use palisade_policy::PolicyError;
use palisade_resource::ResourceError;
use thiserror::Error;

/// Coordinator errors
///
/// Downstream failures propagate with their own kind; the coordinator adds
/// only the request-validation and deadline kinds of its own.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Caller-side programming error: an unusable request.
    #[error("invalid register request: {0}")]
    InvalidRequest(String),

    /// A downstream call exceeded its configured deadline.
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error(transparent)]
    User(#[from] DirectoryError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl CoordinatorError {
    pub fn error_code(&self) -> &'static str {
        match self {
            CoordinatorError::InvalidRequest(_) => "INVALID_REQUEST",
            CoordinatorError::Timeout { .. } => "TIMEOUT",
            CoordinatorError::User(e) => e.error_code(),
            CoordinatorError::Resource(e) => e.error_code(),
            CoordinatorError::Policy(e) => e.error_code(),
            CoordinatorError::Cache(e) => e.error_code(),
        }
    }
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;
