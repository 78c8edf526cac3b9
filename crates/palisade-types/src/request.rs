//! Registration round-trip types
//!
//! A `RegisterDataRequest` goes in; a `DataRequestResponse` (token plus
//! resource-to-connection map) comes back. Resource maps preserve insertion
//! order because downstream split planning partitions by position.

use crate::{Context, LeafResource, RequestToken, ResourceId, UserId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque descriptor a client uses to open a stream against one data node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionDetail {
    /// Endpoint locator, e.g. "http://data-node-1:8084/data"
    pub uri: String,
}

impl ConnectionDetail {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Insertion-ordered map from leaf resource to its data-node connection
pub type ResourceMap = IndexMap<LeafResource, ConnectionDetail>;

/// A client's request to read a named resource under a stated identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterDataRequest {
    /// Logical name of the resource to read; expanded by the provider
    pub resource_id: ResourceId,

    pub user_id: UserId,

    pub context: Context,
}

impl RegisterDataRequest {
    pub fn new(
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: ResourceId::new(resource_id),
            user_id: UserId::new(user_id),
            context: Context::new(justification),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}

/// The redeemable outcome of one registration
///
/// The token uniquely identifies the planning outcome; the map keys are
/// unique leaves the user may access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequestResponse {
    pub token: RequestToken,

    #[serde(with = "resource_map_entries")]
    pub resources: ResourceMap,
}

impl DataRequestResponse {
    pub fn new(token: RequestToken) -> Self {
        Self {
            token,
            resources: ResourceMap::new(),
        }
    }

    pub fn with_resource(mut self, leaf: LeafResource, connection: ConnectionDetail) -> Self {
        self.resources.insert(leaf, connection);
        self
    }
}

/// Serialises a `ResourceMap` as a sequence of entries.
///
/// JSON object keys must be strings, so the map is carried as
/// `[(leaf, connection), ...]` on the wire; insertion order survives.
mod resource_map_entries {
    use super::{ConnectionDetail, LeafResource, ResourceMap};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(map: &ResourceMap, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<(&LeafResource, &ConnectionDetail)> = map.iter().collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ResourceMap, D::Error> {
        let entries: Vec<(LeafResource, ConnectionDetail)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_value_equality() {
        let a = RegisterDataRequest::new("res", "alice", "audit");
        let b = RegisterDataRequest::new("res", "alice", "audit");
        assert_eq!(a, b);
    }

    #[test]
    fn test_response_round_trip_preserves_order() {
        let mut response = DataRequestResponse::new(RequestToken::generate());
        for i in 0..5 {
            response.resources.insert(
                LeafResource::new(format!("id{i}"), "t", "csv"),
                ConnectionDetail::new(format!("con{i}")),
            );
        }

        let json = serde_json::to_string(&response).unwrap();
        let back: DataRequestResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
        let ids: Vec<&str> = back.resources.keys().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["id0", "id1", "id2", "id3", "id4"]);
    }
}
