//! Input splits

use palisade_types::{DataRequestResponse, RequestToken, ResourceMap};
use serde::{Deserialize, Serialize};

/// One unit of parallel work
///
/// A split is a non-empty subset of one registration response's resource
/// map, still carrying the parent's token; splits from one planning cover
/// the parent map exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalisadeInputSplit {
    response: DataRequestResponse,
}

impl PalisadeInputSplit {
    pub fn new(response: DataRequestResponse) -> Self {
        Self { response }
    }

    /// The parent registration's token, presented when redeeming reads.
    pub fn token(&self) -> &RequestToken {
        &self.response.token
    }

    pub fn resources(&self) -> &ResourceMap {
        &self.response.resources
    }

    pub fn response(&self) -> &DataRequestResponse {
        &self.response
    }

    pub fn len(&self) -> usize {
        self.response.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.resources.is_empty()
    }
}
