//! The resource hierarchy
//!
//! Resources form finite, cycle-free chains from a leaf up to a root. Only
//! leaves back actual data; directories and roots exist so that policy can
//! be attached part-way up the tree and inherited downwards.

use crate::ResourceId;
use serde::{Deserialize, Serialize};

/// A node in the resource hierarchy
///
/// The parent chain is acyclic by construction: each node owns its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    /// Top of a hierarchy, e.g. a data system
    Root { id: ResourceId },

    /// An intermediate grouping, e.g. a directory
    Directory {
        id: ResourceId,
        parent: Box<Resource>,
    },

    /// A data-bearing resource, e.g. a file or table partition
    Leaf(LeafResource),
}

/// A resource that directly backs data
///
/// Leaf ids are globally unique. The parent is optional so detached leaves
/// (common in tests and flat stores) still work; the hierarchy walk simply
/// stops where the chain ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeafResource {
    pub id: ResourceId,

    /// Declared data type, e.g. "employee"
    pub resource_type: String,

    /// Serialised format of the backing data, e.g. "avro"
    pub serialised_format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Resource>>,
}

impl LeafResource {
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        serialised_format: impl Into<String>,
    ) -> Self {
        Self {
            id: ResourceId::new(id),
            resource_type: resource_type.into(),
            serialised_format: serialised_format.into(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: Resource) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Resource ids from the farthest ancestor down to this leaf itself.
    ///
    /// This is the traversal order of the hierarchical policy walk.
    pub fn lineage(&self) -> Vec<ResourceId> {
        let mut ids = vec![self.id.clone()];
        let mut current = self.parent.as_deref();
        while let Some(resource) = current {
            ids.push(resource.id().clone());
            current = resource.parent();
        }
        ids.reverse();
        ids
    }
}

impl Resource {
    pub fn root(id: impl Into<String>) -> Self {
        Resource::Root {
            id: ResourceId::new(id),
        }
    }

    pub fn directory(id: impl Into<String>, parent: Resource) -> Self {
        Resource::Directory {
            id: ResourceId::new(id),
            parent: Box::new(parent),
        }
    }

    pub fn id(&self) -> &ResourceId {
        match self {
            Resource::Root { id } => id,
            Resource::Directory { id, .. } => id,
            Resource::Leaf(leaf) => &leaf.id,
        }
    }

    pub fn parent(&self) -> Option<&Resource> {
        match self {
            Resource::Root { .. } => None,
            Resource::Directory { parent, .. } => Some(parent),
            Resource::Leaf(leaf) => leaf.parent.as_deref(),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafResource> {
        match self {
            Resource::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}

impl From<LeafResource> for Resource {
    fn from(leaf: LeafResource) -> Self {
        Resource::Leaf(leaf)
    }
}
