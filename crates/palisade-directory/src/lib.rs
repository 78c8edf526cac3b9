//! Palisade Directory - user lookup for request flows
//!
//! Maps a user identifier to the stored user record (auths, roles). Admin
//! operations seed the directory; request flows only read it.

#![deny(unsafe_code)]

use async_trait::async_trait;
use palisade_cache::{CacheError, CacheNamespace, CacheService, CachedValue};
use palisade_types::{User, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Directory errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no such user: {0}")]
    NoSuchUser(UserId),

    #[error("invalid user record: {0}")]
    InvalidUser(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl DirectoryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::NoSuchUser(_) => "NO_SUCH_USER",
            DirectoryError::InvalidUser(_) => "INVALID_USER",
            DirectoryError::Cache(e) => e.error_code(),
        }
    }
}

/// Result type for directory operations
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// The user directory contract
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NoSuchUser`] when the user is unknown.
    async fn get_user(&self, id: &UserId) -> DirectoryResult<User>;

    /// Stores (or replaces) a user record.
    async fn add_user(&self, user: User) -> DirectoryResult<bool>;
}

/// Directory backed by the cache gateway under its own namespace
pub struct CachedUserDirectory {
    cache: Arc<dyn CacheService>,
}

impl CachedUserDirectory {
    pub fn new(cache: Arc<dyn CacheService>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl UserDirectory for CachedUserDirectory {
    async fn get_user(&self, id: &UserId) -> DirectoryResult<User> {
        let cached = self.cache.get(CacheNamespace::User, id.as_str()).await?;
        match cached {
            Some(CachedValue::User(user)) => Ok(user),
            Some(other) => Err(DirectoryError::InvalidUser(format!(
                "user key held a non-user value: {other:?}"
            ))),
            None => Err(DirectoryError::NoSuchUser(id.clone())),
        }
    }

    async fn add_user(&self, user: User) -> DirectoryResult<bool> {
        if !user.id.is_valid() {
            return Err(DirectoryError::InvalidUser(
                "user id must be non-empty".to_string(),
            ));
        }
        debug!(user = %user.id, "storing user record");
        let key = user.id.as_str().to_string();
        Ok(self
            .cache
            .add(CacheNamespace::User, &key, CachedValue::User(user), None)
            .await?)
    }
}
