//! The resource provider contract

use crate::{ResourceError, ResourceResult};
use async_trait::async_trait;
use palisade_types::{ConnectionDetail, LeafResource, Resource, ResourceId, ResourceMap};

/// Expands logical names into concrete leaf resources
///
/// Availability is not access: a provider answers what exists, the policy
/// resolver decides what the user may see.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// All leaves backing the named resource (itself, or any descendant).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the name matches nothing.
    async fn resources_by_id(&self, id: &ResourceId) -> ResourceResult<ResourceMap>;

    /// As [`resources_by_id`](Self::resources_by_id), for an already-resolved
    /// resource object.
    async fn resources_by_resource(&self, resource: &Resource) -> ResourceResult<ResourceMap> {
        self.resources_by_id(resource.id()).await
    }

    /// Every known leaf of the given declared data type. May be empty.
    async fn resources_by_type(&self, resource_type: &str) -> ResourceResult<ResourceMap>;

    /// Every known leaf with the given serialised format. May be empty.
    async fn resources_by_serialised_format(&self, format: &str) -> ResourceResult<ResourceMap>;

    /// Registers a leaf with its connection detail.
    ///
    /// Optional: providers that mirror a real store reject this.
    async fn add_resource(
        &self,
        _leaf: LeafResource,
        _connection: ConnectionDetail,
    ) -> ResourceResult<bool> {
        Err(ResourceError::AddNotSupported)
    }
}
