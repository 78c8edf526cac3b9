//! In-memory resource provider
//!
//! Keeps registered leaves in insertion order, which downstream split
//! planning relies on for deterministic round-robin placement.

use crate::{ResourceError, ResourceProvider, ResourceResult};
use async_trait::async_trait;
use palisade_types::{ConnectionDetail, LeafResource, ResourceId, ResourceMap};
use std::sync::RwLock;
use tracing::debug;

/// Development/testing provider over an in-process catalogue
pub struct InMemoryResourceProvider {
    leaves: RwLock<ResourceMap>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self {
            leaves: RwLock::new(ResourceMap::new()),
        }
    }

    fn filtered<F>(&self, keep: F) -> ResourceResult<ResourceMap>
    where
        F: Fn(&LeafResource) -> bool,
    {
        let leaves = self
            .leaves
            .read()
            .map_err(|_| ResourceError::Unavailable("catalogue lock poisoned".to_string()))?;
        Ok(leaves
            .iter()
            .filter(|(leaf, _)| keep(leaf))
            .map(|(leaf, connection)| (leaf.clone(), connection.clone()))
            .collect())
    }
}

impl Default for InMemoryResourceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceProvider for InMemoryResourceProvider {
    async fn resources_by_id(&self, id: &ResourceId) -> ResourceResult<ResourceMap> {
        let matches = self.filtered(|leaf| leaf.lineage().contains(id))?;
        if matches.is_empty() {
            return Err(ResourceError::NotFound(id.clone()));
        }
        debug!(resource = %id, leaves = matches.len(), "expanded logical name");
        Ok(matches)
    }

    async fn resources_by_type(&self, resource_type: &str) -> ResourceResult<ResourceMap> {
        self.filtered(|leaf| leaf.resource_type == resource_type)
    }

    async fn resources_by_serialised_format(&self, format: &str) -> ResourceResult<ResourceMap> {
        self.filtered(|leaf| leaf.serialised_format == format)
    }

    async fn add_resource(
        &self,
        leaf: LeafResource,
        connection: ConnectionDetail,
    ) -> ResourceResult<bool> {
        let mut leaves = self
            .leaves
            .write()
            .map_err(|_| ResourceError::Unavailable("catalogue lock poisoned".to_string()))?;
        leaves.insert(leaf, connection);
        Ok(true)
    }
}
