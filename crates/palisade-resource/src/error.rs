//! Resource provider error types

use palisade_types::ResourceId;
use thiserror::Error;

/// Resource provider errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Nothing is registered under the requested name.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// The backing catalogue could not be reached; callers may retry.
    #[error("resource provider unavailable: {0}")]
    Unavailable(String),

    /// This provider mirrors an external store and cannot accept resources.
    #[error("this resource provider does not support adding resources")]
    AddNotSupported,
}

impl ResourceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ResourceError::NotFound(_) => "RESOURCE_NOT_FOUND",
            ResourceError::Unavailable(_) => "PROVIDER_UNAVAILABLE",
            ResourceError::AddNotSupported => "ADD_NOT_SUPPORTED",
        }
    }
}

/// Result type for provider operations
pub type ResourceResult<T> = std::result::Result<T, ResourceError>;
