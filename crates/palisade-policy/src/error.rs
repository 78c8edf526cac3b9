//! Policy resolver error types

use palisade_cache::CacheError;
use thiserror::Error;

/// Policy resolver errors
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The resolver was built without a cache service.
    #[error("no cache service configured for the policy resolver")]
    NoConfig,

    /// A policy key held something that is not a policy.
    #[error("malformed policy binding: {0}")]
    Malformed(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl PolicyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PolicyError::NoConfig => "NO_CONFIG",
            PolicyError::Malformed(_) => "POLICY_MALFORMED",
            PolicyError::Cache(e) => e.error_code(),
        }
    }
}

/// Result type for policy operations
pub type PolicyResult<T> = std::result::Result<T, PolicyError>;
