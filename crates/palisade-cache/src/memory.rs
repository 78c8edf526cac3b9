//! In-memory cache backend
//!
//! Suitable for development, testing, and single-process deployments.
//! Entries expire lazily: an expired entry is dropped by the read or listing
//! that finds it.

use crate::{CacheNamespace, CacheResult, CacheService, CachedValue};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry {
    value: CachedValue,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// In-memory cache gateway
pub struct InMemoryCacheService {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCacheService {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn full_key(namespace: CacheNamespace, key: &str) -> String {
        format!("{}:{}", namespace.as_prefix(), key)
    }
}

impl Default for InMemoryCacheService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for InMemoryCacheService {
    async fn add(
        &self,
        namespace: CacheNamespace,
        key: &str,
        value: CachedValue,
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(Self::full_key(namespace, key), CacheEntry { value, expires_at });
        debug!(namespace = namespace.as_prefix(), key, "cache add");
        Ok(true)
    }

    async fn get(&self, namespace: CacheNamespace, key: &str) -> CacheResult<Option<CachedValue>> {
        let full_key = Self::full_key(namespace, key);
        let now = Instant::now();

        // The read guard is released when the match ends; the expired entry
        // is removed outside it to avoid deadlocking the shard.
        match self.entries.get(&full_key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        self.entries.remove(&full_key);
        debug!(namespace = namespace.as_prefix(), key, "cache entry expired");
        Ok(None)
    }

    async fn list(&self, namespace: CacheNamespace, prefix: &str) -> CacheResult<Vec<String>> {
        let ns_prefix = format!("{}:", namespace.as_prefix());
        let now = Instant::now();

        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .filter_map(|entry| {
                entry
                    .key()
                    .strip_prefix(&ns_prefix)
                    .filter(|key| key.starts_with(prefix))
                    .map(str::to_string)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_types::User;

    fn alice() -> CachedValue {
        CachedValue::User(User::new("alice").with_auths(["public"]))
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let cache = InMemoryCacheService::new();
        assert!(cache
            .add(CacheNamespace::User, "alice", alice(), None)
            .await
            .unwrap());

        let got = cache.get(CacheNamespace::User, "alice").await.unwrap();
        match got {
            Some(CachedValue::User(user)) => assert_eq!(user.id.as_str(), "alice"),
            other => panic!("unexpected cache value: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_namespaces_are_disjoint() {
        let cache = InMemoryCacheService::new();
        cache
            .add(CacheNamespace::User, "shared-key", alice(), None)
            .await
            .unwrap();

        let from_policy = cache
            .get(CacheNamespace::Policy, "shared-key")
            .await
            .unwrap();
        assert!(from_policy.is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = InMemoryCacheService::new();
        cache
            .add(
                CacheNamespace::Coordinator,
                "token",
                alice(),
                Some(Duration::from_millis(20)),
            )
            .await
            .unwrap();

        assert!(cache
            .get(CacheNamespace::Coordinator, "token")
            .await
            .unwrap()
            .is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache
            .get(CacheNamespace::Coordinator, "token")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let cache = InMemoryCacheService::new();
        for key in ["resourcePolicy./a", "resourcePolicy./b", "dataTypePolicy.t"] {
            cache
                .add(CacheNamespace::Policy, key, alice(), None)
                .await
                .unwrap();
        }

        let keys = cache
            .list(CacheNamespace::Policy, "resourcePolicy.")
            .await
            .unwrap();
        assert_eq!(keys, vec!["resourcePolicy./a", "resourcePolicy./b"]);
    }
}
