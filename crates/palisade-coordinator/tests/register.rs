//! Registration flow over the in-memory service stack

use async_trait::async_trait;
use palisade_cache::{CacheNamespace, CacheService, CachedValue, InMemoryCacheService};
use palisade_coordinator::{CoordinatorConfig, CoordinatorError, PalisadeCoordinator, PalisadeService};
use palisade_directory::{CachedUserDirectory, DirectoryError, DirectoryResult, UserDirectory};
use palisade_policy::{HierarchicalPolicyResolver, PolicyResolver};
use palisade_resource::{InMemoryResourceProvider, ResourceProvider};
use palisade_types::{
    ConnectionDetail, Context, LeafResource, Policy, Record, RegisterDataRequest, Resource, Rules,
    User,
};
use std::sync::Arc;
use std::time::Duration;

struct Stack {
    cache: Arc<InMemoryCacheService>,
    directory: Arc<CachedUserDirectory>,
    provider: Arc<InMemoryResourceProvider>,
    resolver: Arc<HierarchicalPolicyResolver>,
}

impl Stack {
    fn coordinator(&self) -> PalisadeCoordinator {
        PalisadeCoordinator::new(
            self.directory.clone(),
            self.provider.clone(),
            self.resolver.clone(),
            self.cache.clone(),
        )
    }
}

fn keep_leaf(leaf: LeafResource, _: &User, _: &Context) -> Option<LeafResource> {
    Some(leaf)
}

fn employee_rules() -> Rules<LeafResource> {
    Rules::new().with_rule("keep", keep_leaf)
}

/// Directory + provider + resolver over one shared cache, seeded with two
/// employee files under `/hr` and a policy on the `employee` type.
async fn seeded_stack() -> Stack {
    let cache = Arc::new(InMemoryCacheService::new());
    let directory = Arc::new(CachedUserDirectory::new(cache.clone()));
    let provider = Arc::new(InMemoryResourceProvider::new());
    let resolver = Arc::new(HierarchicalPolicyResolver::new(cache.clone()));

    directory
        .add_user(User::new("alice").with_auths(["public", "private"]))
        .await
        .unwrap();

    let hr = Resource::directory("/hr", Resource::root("/"));
    for name in ["/hr/contacts", "/hr/salaries"] {
        provider
            .add_resource(
                LeafResource::new(name, "employee", "avro").with_parent(hr.clone()),
                ConnectionDetail::new(format!("http://node{name}")),
            )
            .await
            .unwrap();
    }

    resolver
        .set_type_policy(
            "employee",
            Policy::new()
                .with_resource_rules(employee_rules())
                .with_record_rules(
                    Rules::new().with_rule("pass", |r: Record, _: &User, _: &Context| Some(r)),
                ),
        )
        .await
        .unwrap();

    Stack {
        cache,
        directory,
        provider,
        resolver,
    }
}

#[tokio::test]
async fn registers_and_caches_policy_map() {
    let stack = seeded_stack().await;
    let coordinator = stack.coordinator();

    let response = coordinator
        .register_data_request(RegisterDataRequest::new("/hr", "alice", "payroll audit"))
        .await
        .unwrap();

    let ids: Vec<&str> = response.resources.keys().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["/hr/contacts", "/hr/salaries"]);

    let cached = stack
        .cache
        .get(CacheNamespace::Coordinator, &response.token.key())
        .await
        .unwrap();
    match cached {
        Some(CachedValue::PolicyMap(map)) => assert_eq!(map.len(), 2),
        other => panic!("expected a cached policy map, got {other:?}"),
    }
}

#[tokio::test]
async fn tokens_are_unique_per_registration() {
    let stack = seeded_stack().await;
    let coordinator = stack.coordinator();
    let request = RegisterDataRequest::new("/hr", "alice", "audit");

    let first = coordinator.register_data_request(request.clone()).await.unwrap();
    let second = coordinator.register_data_request(request).await.unwrap();
    assert_ne!(first.token, second.token);
}

#[tokio::test]
async fn unknown_user_fails_and_caches_nothing() {
    let stack = seeded_stack().await;
    let coordinator = stack.coordinator();

    let err = coordinator
        .register_data_request(RegisterDataRequest::new("/hr", "mallory", "snooping"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NO_SUCH_USER");

    let tokens = stack
        .cache
        .list(CacheNamespace::Coordinator, "")
        .await
        .unwrap();
    assert!(tokens.is_empty());
}

#[tokio::test]
async fn unknown_resource_fails() {
    let stack = seeded_stack().await;
    let coordinator = stack.coordinator();

    let err = coordinator
        .register_data_request(RegisterDataRequest::new("/nowhere", "alice", "audit"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn resources_without_policy_are_filtered_not_fatal() {
    let stack = seeded_stack().await;
    // A leaf of a type with no policy anywhere in its chain.
    stack
        .provider
        .add_resource(
            LeafResource::new("/logs/access", "audit", "csv"),
            ConnectionDetail::new("http://node/logs"),
        )
        .await
        .unwrap();
    let coordinator = stack.coordinator();

    let response = coordinator
        .register_data_request(RegisterDataRequest::new("/logs/access", "alice", "audit"))
        .await
        .unwrap();
    assert!(response.resources.is_empty());
}

#[tokio::test]
async fn blank_justification_is_invalid() {
    let stack = seeded_stack().await;
    let coordinator = stack.coordinator();

    let err = coordinator
        .register_data_request(RegisterDataRequest::new("/hr", "alice", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::InvalidRequest(_)));
    assert_eq!(err.error_code(), "INVALID_REQUEST");
}

struct SlowDirectory;

#[async_trait]
impl UserDirectory for SlowDirectory {
    async fn get_user(&self, _: &palisade_types::UserId) -> DirectoryResult<User> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(User::new("alice"))
    }

    async fn add_user(&self, _: User) -> DirectoryResult<bool> {
        Err(DirectoryError::InvalidUser("read-only".to_string()))
    }
}

#[tokio::test]
async fn slow_downstream_call_times_out() {
    let stack = seeded_stack().await;
    let coordinator = PalisadeCoordinator::new(
        Arc::new(SlowDirectory),
        stack.provider.clone(),
        stack.resolver.clone(),
        stack.cache.clone(),
    )
    .with_config(CoordinatorConfig {
        token_ttl_secs: 600,
        call_timeout_secs: 0,
    });

    let err = coordinator
        .register_data_request(RegisterDataRequest::new("/hr", "alice", "audit"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "TIMEOUT");
}
