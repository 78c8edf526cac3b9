//! Request registration

use crate::{CoordinatorConfig, CoordinatorError, CoordinatorResult};
use async_trait::async_trait;
use palisade_cache::{CacheNamespace, CacheService, CachedValue};
use palisade_directory::UserDirectory;
use palisade_policy::{GetPolicyRequest, PolicyResolver};
use palisade_resource::ResourceProvider;
use palisade_types::{
    DataRequestResponse, LeafResource, RegisterDataRequest, RequestToken, ResourceId,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The registration contract clients and planners call
#[async_trait]
pub trait PalisadeService: Send + Sync {
    /// Registers a data request and returns the redeemable response.
    ///
    /// # Errors
    ///
    /// Fails with the kind of whichever step failed; nothing is cached on
    /// failure.
    async fn register_data_request(
        &self,
        request: RegisterDataRequest,
    ) -> CoordinatorResult<DataRequestResponse>;
}

/// The coordinator: fan-out over the directory, provider, and resolver
pub struct PalisadeCoordinator {
    users: Arc<dyn UserDirectory>,
    resources: Arc<dyn ResourceProvider>,
    policy: Arc<dyn PolicyResolver>,
    cache: Arc<dyn CacheService>,
    config: CoordinatorConfig,
}

impl PalisadeCoordinator {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        resources: Arc<dyn ResourceProvider>,
        policy: Arc<dyn PolicyResolver>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            users,
            resources,
            policy,
            cache,
            config: CoordinatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Applies the configured deadline to one downstream call.
    async fn bounded<T, E, F>(&self, operation: &'static str, call: F) -> CoordinatorResult<T>
    where
        F: Future<Output = Result<T, E>>,
        CoordinatorError: From<E>,
    {
        match tokio::time::timeout(self.config.call_timeout(), call).await {
            Ok(result) => result.map_err(CoordinatorError::from),
            Err(_) => Err(CoordinatorError::Timeout { operation }),
        }
    }
}

fn validate(request: &RegisterDataRequest) -> CoordinatorResult<()> {
    if !request.user_id.is_valid() {
        return Err(CoordinatorError::InvalidRequest(
            "user id must be non-empty".to_string(),
        ));
    }
    if !request.resource_id.is_valid() {
        return Err(CoordinatorError::InvalidRequest(
            "resource name must be non-empty".to_string(),
        ));
    }
    if !request.context.is_valid() {
        return Err(CoordinatorError::InvalidRequest(
            "a justification is required".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl PalisadeService for PalisadeCoordinator {
    #[instrument(skip_all, fields(user = %request.user_id, resource = %request.resource_id))]
    async fn register_data_request(
        &self,
        request: RegisterDataRequest,
    ) -> CoordinatorResult<DataRequestResponse> {
        validate(&request)?;

        let user_call = self.bounded("user lookup", self.users.get_user(&request.user_id));
        let resource_call = self.bounded(
            "resource expansion",
            self.resources.resources_by_id(&request.resource_id),
        );
        let (user, resource_map) = tokio::join!(user_call, resource_call);
        let user = user?;
        let resource_map = resource_map?;

        let leaves: Vec<LeafResource> = resource_map.keys().cloned().collect();
        let accessible = self
            .bounded(
                "access filter",
                self.policy.can_access(&request.context, &user, leaves),
            )
            .await?;
        debug!(
            offered = resource_map.len(),
            accessible = accessible.len(),
            "filtered resources against policy"
        );

        let token = RequestToken::generate();
        let policies = self
            .bounded(
                "policy retrieval",
                self.policy.get_policy(GetPolicyRequest {
                    context: request.context.clone(),
                    user,
                    resources: accessible.clone(),
                }),
            )
            .await?;

        let stored = self
            .bounded(
                "policy map caching",
                self.cache.add(
                    CacheNamespace::Coordinator,
                    &token.key(),
                    CachedValue::PolicyMap(policies),
                    Some(self.config.token_ttl()),
                ),
            )
            .await?;
        if !stored {
            return Err(palisade_cache::CacheError::Unavailable(
                "cache rejected the policy map write".to_string(),
            )
            .into());
        }

        // Rules may have transformed a leaf, so match survivors by id while
        // keeping the provider's insertion order.
        let mut survivors: HashMap<ResourceId, LeafResource> = accessible
            .into_iter()
            .map(|leaf| (leaf.id.clone(), leaf))
            .collect();
        let mut response = DataRequestResponse::new(token.clone());
        for (leaf, connection) in resource_map {
            if let Some(kept) = survivors.remove(&leaf.id) {
                response.resources.insert(kept, connection);
            }
        }

        info!(
            token = %token,
            resources = response.resources.len(),
            "registered data request"
        );
        Ok(response)
    }
}
