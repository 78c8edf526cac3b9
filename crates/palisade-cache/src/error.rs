//! Cache gateway error types

use thiserror::Error;

/// Cache gateway errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached; callers may retry.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Stable error code for the wire envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            CacheError::Unavailable(_) => "CACHE_UNAVAILABLE",
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;
