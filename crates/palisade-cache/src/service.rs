//! The cache gateway contract

use crate::CacheResult;
use async_trait::async_trait;
use palisade_types::{LeafResource, Policy, User};
use std::collections::HashMap;
use std::time::Duration;

/// Keyspace of the owning service
///
/// Namespaces keep service keys disjoint: a policy binding can never collide
/// with a user record even under the same raw key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// User directory records, keyed by user id
    User,

    /// Policy bindings, keyed by `resourcePolicy.<id>` / `dataTypePolicy.<type>`
    Policy,

    /// Per-token policy maps minted by the coordinator
    Coordinator,
}

impl CacheNamespace {
    pub fn as_prefix(&self) -> &'static str {
        match self {
            CacheNamespace::User => "user-service",
            CacheNamespace::Policy => "policy-service",
            CacheNamespace::Coordinator => "palisade-service",
        }
    }
}

/// A typed value the gateway stores
///
/// Rule implementations are shared predicates rather than wire data, so the
/// gateway stores typed values and clones on read instead of serialising.
#[derive(Debug, Clone)]
pub enum CachedValue {
    User(User),
    Policy(Policy),
    PolicyMap(HashMap<LeafResource, Policy>),
}

/// Async key/value store namespaced by owning service
///
/// Guarantees read-your-writes per key within one gateway instance; there
/// are no cross-key transactions.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Stores `value` under `(namespace, key)`.
    ///
    /// Completes `true` on durable acceptance, `false` if the backend
    /// rejected the write (quota, validation).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`](crate::CacheError::Unavailable)
    /// when the backend cannot be reached.
    async fn add(
        &self,
        namespace: CacheNamespace,
        key: &str,
        value: CachedValue,
        ttl: Option<Duration>,
    ) -> CacheResult<bool>;

    /// Fetches the value under `(namespace, key)`; `None` if absent or
    /// expired.
    async fn get(&self, namespace: CacheNamespace, key: &str) -> CacheResult<Option<CachedValue>>;

    /// Enumerates live keys in `namespace` starting with `prefix`.
    async fn list(&self, namespace: CacheNamespace, prefix: &str) -> CacheResult<Vec<String>>;
}
