//! Hierarchy walk and rule merging

use crate::{PolicyError, PolicyResult};
use async_trait::async_trait;
use palisade_cache::{CacheNamespace, CacheService, CachedValue};
use palisade_types::{Context, LeafResource, Policy, Record, Resource, RuleEntry, Rules, User};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Cache key prefix for resource-keyed policy bindings.
pub const RESOURCE_POLICY_PREFIX: &str = "resourcePolicy.";

/// Cache key prefix for data-type-keyed policy bindings.
pub const DATA_TYPE_POLICY_PREFIX: &str = "dataTypePolicy.";

/// Request payload for [`PolicyResolver::get_policy`]
#[derive(Debug, Clone)]
pub struct GetPolicyRequest {
    pub context: Context,
    pub user: User,
    pub resources: Vec<LeafResource>,
}

/// The policy resolver contract
#[async_trait]
pub trait PolicyResolver: Send + Sync {
    /// The subset of `resources` the user may see after resource-level rules.
    ///
    /// A resource survives iff some policy applies to it and the merged
    /// resource-rule chain keeps it. Surviving resources are returned as the
    /// rules left them (rules may transform as well as filter).
    async fn can_access(
        &self,
        context: &Context,
        user: &User,
        resources: Vec<LeafResource>,
    ) -> PolicyResult<Vec<LeafResource>>;

    /// The merged record-rule policy for each accessible resource.
    async fn get_policy(
        &self,
        request: GetPolicyRequest,
    ) -> PolicyResult<HashMap<LeafResource, Policy>>;

    /// Binds `policy` to a resource anywhere in the hierarchy.
    async fn set_resource_policy(&self, resource: &Resource, policy: Policy) -> PolicyResult<bool>;

    /// Binds `policy` to a declared data type.
    async fn set_type_policy(&self, resource_type: &str, policy: Policy) -> PolicyResult<bool>;
}

/// Builder enforcing that a cache service is configured
#[derive(Default)]
pub struct HierarchicalPolicyResolverBuilder {
    cache: Option<Arc<dyn CacheService>>,
}

impl HierarchicalPolicyResolverBuilder {
    pub fn cache(mut self, cache: Arc<dyn CacheService>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// # Errors
    ///
    /// Returns [`PolicyError::NoConfig`] when no cache service was supplied.
    pub fn build(self) -> PolicyResult<HierarchicalPolicyResolver> {
        let cache = self.cache.ok_or(PolicyError::NoConfig)?;
        Ok(HierarchicalPolicyResolver { cache })
    }
}

/// Resolver that merges policy bindings down the resource hierarchy
///
/// Stateless per request; every binding lives in the cache.
pub struct HierarchicalPolicyResolver {
    cache: Arc<dyn CacheService>,
}

impl std::fmt::Debug for HierarchicalPolicyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalPolicyResolver").finish()
    }
}

impl HierarchicalPolicyResolver {
    pub fn new(cache: Arc<dyn CacheService>) -> Self {
        Self { cache }
    }

    pub fn builder() -> HierarchicalPolicyResolverBuilder {
        HierarchicalPolicyResolverBuilder::default()
    }

    /// Merged resource-level rule chain for `leaf`, absent when no binding
    /// in the chain carries resource rules.
    pub async fn applicable_resource_rules(
        &self,
        leaf: &LeafResource,
    ) -> PolicyResult<Option<Rules<LeafResource>>> {
        self.applicable_rules(leaf, |policy| present_side(&policy.resource_rules))
            .await
    }

    /// Merged record-level rule chain for `leaf`.
    pub async fn applicable_record_rules(
        &self,
        leaf: &LeafResource,
    ) -> PolicyResult<Option<Rules<Record>>> {
        self.applicable_rules(leaf, |policy| present_side(&policy.record_rules))
            .await
    }

    /// Walks `[data type, farthest ancestor, .., leaf]` and merges bindings
    /// in traversal order.
    ///
    /// The walk is materialised up front; fetch results are merged strictly
    /// in chain order whatever order they complete in.
    async fn applicable_rules<T, F>(
        &self,
        leaf: &LeafResource,
        extract: F,
    ) -> PolicyResult<Option<Rules<T>>>
    where
        F: Fn(&Policy) -> Option<Rules<T>>,
    {
        let mut keys = vec![format!("{DATA_TYPE_POLICY_PREFIX}{}", leaf.resource_type)];
        keys.extend(
            leaf.lineage()
                .iter()
                .map(|id| format!("{RESOURCE_POLICY_PREFIX}{}", id.as_str())),
        );

        let mut accumulated: Option<Rules<T>> = None;
        for key in &keys {
            let new = self.fetch_policy(key).await?.as_ref().map(&extract);
            accumulated = merge_rules(accumulated, new.flatten());
        }

        // Whatever negations are left never had an inherited target; the
        // final chain carries applicable rules only.
        if let Some(rules) = accumulated.as_mut() {
            rules.strip_negations();
        }
        Ok(accumulated)
    }

    async fn fetch_policy(&self, key: &str) -> PolicyResult<Option<Policy>> {
        match self.cache.get(CacheNamespace::Policy, key).await? {
            Some(CachedValue::Policy(policy)) => Ok(Some(policy)),
            Some(other) => Err(PolicyError::Malformed(format!(
                "policy key {key} held a non-policy value: {other:?}"
            ))),
            None => Ok(None),
        }
    }
}

/// A policy side contributes to the merge only when it was actually set.
fn present_side<T>(rules: &Rules<T>) -> Option<Rules<T>> {
    if rules.is_empty() && !rules.message_is_set() {
        None
    } else {
        Some(rules.clone())
    }
}

/// Merges `new` onto `accumulated`, always producing a fresh container.
///
/// Lists concatenate in `(accumulated, new)` order; both messages kept when
/// both are set; a negation in `new` removes every matching name from the
/// combined list and is itself dropped.
fn merge_rules<T>(accumulated: Option<Rules<T>>, new: Option<Rules<T>>) -> Option<Rules<T>> {
    let (mut merged, new) = match (accumulated, new) {
        (Some(accumulated), Some(new)) => (accumulated, new),
        (Some(accumulated), None) => return Some(accumulated),
        (None, new) => return new,
    };

    if new.message_is_set() {
        if merged.message_is_set() {
            merged.set_message(format!("{}, {}", merged.message(), new.message()));
        } else {
            merged.set_message(new.message());
        }
    }

    merged.extend(new.entries().iter().cloned());
    for entry in new.entries() {
        if let RuleEntry::Negate { target } = entry {
            merged.remove_named(target);
        }
    }
    merged.strip_negations();
    Some(merged)
}

#[async_trait]
impl PolicyResolver for HierarchicalPolicyResolver {
    #[instrument(skip_all, fields(user = %user.id, resources = resources.len()))]
    async fn can_access(
        &self,
        context: &Context,
        user: &User,
        resources: Vec<LeafResource>,
    ) -> PolicyResult<Vec<LeafResource>> {
        let mut accessible = Vec::new();
        for resource in resources {
            match self.applicable_resource_rules(&resource).await? {
                Some(rules) => match rules.apply_to(resource.clone(), user, context) {
                    Some(kept) => accessible.push(kept),
                    None => {
                        debug!(resource = %resource.id, "resource-level rules removed resource")
                    }
                },
                None => {
                    debug!(resource = %resource.id, "no policy for resource, removing from list")
                }
            }
        }
        Ok(accessible)
    }

    #[instrument(skip_all, fields(user = %request.user.id, resources = request.resources.len()))]
    async fn get_policy(
        &self,
        request: GetPolicyRequest,
    ) -> PolicyResult<HashMap<LeafResource, Policy>> {
        let accessible = self
            .can_access(&request.context, &request.user, request.resources)
            .await?;

        // Resource-level rules exist for everything left, so record-level
        // rules should too; a gap is a mis-bound policy, not a failure.
        let mut policies = HashMap::new();
        for resource in accessible {
            match self.applicable_record_rules(&resource).await? {
                Some(rules) => {
                    policies.insert(resource, Policy::new().with_record_rules(rules));
                }
                None => warn!(
                    resource = %resource.id,
                    "no record-level rules for an accessible resource; omitting it"
                ),
            }
        }
        Ok(policies)
    }

    async fn set_resource_policy(&self, resource: &Resource, policy: Policy) -> PolicyResult<bool> {
        let key = format!("{RESOURCE_POLICY_PREFIX}{}", resource.id().as_str());
        debug!(resource = %resource.id(), "binding resource policy");
        Ok(self
            .cache
            .add(
                CacheNamespace::Policy,
                &key,
                CachedValue::Policy(policy),
                None,
            )
            .await?)
    }

    async fn set_type_policy(&self, resource_type: &str, policy: Policy) -> PolicyResult<bool> {
        let key = format!("{DATA_TYPE_POLICY_PREFIX}{resource_type}");
        debug!(resource_type, "binding data-type policy");
        Ok(self
            .cache
            .add(
                CacheNamespace::Policy,
                &key,
                CachedValue::Policy(policy),
                None,
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_cache::InMemoryCacheService;

    fn resolver() -> HierarchicalPolicyResolver {
        HierarchicalPolicyResolver::new(Arc::new(InMemoryCacheService::new()))
    }

    fn keep_all(leaf: LeafResource, _: &User, _: &Context) -> Option<LeafResource> {
        Some(leaf)
    }

    fn keep(name: &str) -> Rules<LeafResource> {
        Rules::new().with_rule(name, keep_all)
    }

    /// `/a/f` of type `employee`, under directory `/a`.
    fn leaf() -> LeafResource {
        let dir = Resource::directory("/a", Resource::root("/"));
        LeafResource::new("/a/f", "employee", "avro").with_parent(dir)
    }

    fn ctx() -> Context {
        Context::new("testing")
    }

    #[tokio::test]
    async fn test_builder_requires_cache() {
        let err = HierarchicalPolicyResolver::builder().build().unwrap_err();
        assert!(matches!(err, PolicyError::NoConfig));
    }

    #[tokio::test]
    async fn test_no_policy_means_inaccessible() {
        let resolver = resolver();
        let accessible = resolver
            .can_access(&ctx(), &User::new("alice"), vec![leaf()])
            .await
            .unwrap();
        assert!(accessible.is_empty());
    }

    #[tokio::test]
    async fn test_inherited_rules_accumulate_in_order() {
        let resolver = resolver();
        resolver
            .set_type_policy("employee", Policy::new().with_resource_rules(keep("vis")))
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::directory("/a", Resource::root("/")),
                Policy::new().with_resource_rules(keep("age_off")),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(leaf()),
                Policy::new().with_resource_rules(keep("own")),
            )
            .await
            .unwrap();

        let rules = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert_eq!(rules.rule_names(), vec!["vis", "age_off", "own"]);
    }

    #[tokio::test]
    async fn test_negation_removes_inherited_rule() {
        let resolver = resolver();
        resolver
            .set_type_policy("employee", Policy::new().with_resource_rules(keep("vis")))
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::directory("/a", Resource::root("/")),
                Policy::new().with_resource_rules(keep("age_off")),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(leaf()),
                Policy::new()
                    .with_resource_rules(Rules::new().with_negation("vis")),
            )
            .await
            .unwrap();

        let rules = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert_eq!(rules.rule_names(), vec!["age_off"]);
    }

    #[tokio::test]
    async fn test_negation_removes_every_occurrence() {
        let resolver = resolver();
        resolver
            .set_type_policy(
                "employee",
                Policy::new().with_resource_rules(keep("vis").with_rule("vis", keep_all)),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::directory("/a", Resource::root("/")),
                Policy::new().with_resource_rules(keep("vis")),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(leaf()),
                Policy::new().with_resource_rules(Rules::new().with_negation("vis")),
            )
            .await
            .unwrap();

        let rules = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert!(rules.rule_names().is_empty());
        // An empty-but-present chain keeps the resource.
        let accessible = resolver
            .can_access(&ctx(), &User::new("alice"), vec![leaf()])
            .await
            .unwrap();
        assert_eq!(accessible.len(), 1);
    }

    #[tokio::test]
    async fn test_message_combination() {
        let resolver = resolver();
        resolver
            .set_type_policy(
                "employee",
                Policy::new().with_resource_rules(keep("vis").with_message("visibility")),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::directory("/a", Resource::root("/")),
                Policy::new().with_resource_rules(keep("age_off")),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(leaf()),
                Policy::new().with_resource_rules(keep("own").with_message("age off")),
            )
            .await
            .unwrap();

        let rules = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert_eq!(rules.message(), "visibility, age off");
    }

    #[tokio::test]
    async fn test_sentinel_message_replaced_not_joined() {
        let resolver = resolver();
        resolver
            .set_type_policy("employee", Policy::new().with_resource_rules(keep("vis")))
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(leaf()),
                Policy::new().with_resource_rules(keep("own").with_message("leaf message")),
            )
            .await
            .unwrap();

        let rules = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert_eq!(rules.message(), "leaf message");
    }

    #[tokio::test]
    async fn test_merge_does_not_mutate_cached_bindings() {
        let resolver = resolver();
        resolver
            .set_type_policy("employee", Policy::new().with_resource_rules(keep("vis")))
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(leaf()),
                Policy::new().with_resource_rules(Rules::new().with_negation("vis")),
            )
            .await
            .unwrap();

        // First resolution consumes the negation.
        let first = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert!(first.rule_names().is_empty());

        // A second walk over the same cached bindings must see them intact.
        let second = resolver
            .applicable_resource_rules(&leaf())
            .await
            .unwrap()
            .expect("merged rules");
        assert!(second.rule_names().is_empty());

        // And the inherited type binding still carries its rule for other
        // resources of the type.
        let sibling = LeafResource::new("/b/g", "employee", "avro");
        let type_only = resolver
            .applicable_resource_rules(&sibling)
            .await
            .unwrap()
            .expect("merged rules");
        assert_eq!(type_only.rule_names(), vec!["vis"]);
    }

    #[tokio::test]
    async fn test_get_policy_omits_resource_without_record_rules() {
        let resolver = resolver();
        let record_keep: Rules<Record> =
            Rules::new().with_rule("pass", |r: Record, _: &User, _: &Context| Some(r));

        let with_records = leaf();
        let without_records = LeafResource::new("/b/g", "employee", "avro");

        resolver
            .set_resource_policy(
                &Resource::Leaf(with_records.clone()),
                Policy::new()
                    .with_resource_rules(keep("vis"))
                    .with_record_rules(record_keep),
            )
            .await
            .unwrap();
        resolver
            .set_resource_policy(
                &Resource::Leaf(without_records.clone()),
                Policy::new().with_resource_rules(keep("vis")),
            )
            .await
            .unwrap();

        let policies = resolver
            .get_policy(GetPolicyRequest {
                context: ctx(),
                user: User::new("alice"),
                resources: vec![with_records.clone(), without_records],
            })
            .await
            .unwrap();

        assert_eq!(policies.len(), 1);
        assert!(policies.contains_key(&with_records));
    }
}
