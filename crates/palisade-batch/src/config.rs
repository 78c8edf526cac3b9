//! Job configuration
//!
//! Batch executors hand jobs a flat string-to-string configuration. The
//! Palisade keys carry the registered requests (a JSON array, order
//! preserved), the parallelism hint, and the serialiser descriptor the
//! record reader uses downstream.

use crate::{PlannerError, PlannerResult};
use palisade_types::RegisterDataRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key holding the JSON array of registered data requests.
pub const REGISTER_REQUESTS_KEY: &str = "palisade.input.register.requests";

/// Key holding the non-negative max-map hint; 0 (or unset) means unlimited.
pub const MAX_MAP_HINT_KEY: &str = "palisade.input.max.map.hint";

/// Key holding the JSON-serialised serialiser descriptor.
pub const SERIALISER_KEY: &str = "palisade.input.serialiser";

/// Descriptor telling the record reader how to decode streamed records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialiserDescriptor {
    /// Format name, e.g. "avro"
    pub format: String,

    /// Format-specific options
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl SerialiserDescriptor {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            options: BTreeMap::new(),
        }
    }
}

/// Flat job-scope configuration map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    entries: BTreeMap<String, String>,
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access, used by executors that merge external configuration.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Appends one request to the registered list.
    ///
    /// Append order is the order planning registers and emits splits in.
    pub fn add_data_request(&mut self, request: RegisterDataRequest) -> PlannerResult<()> {
        let mut requests = self.data_requests()?;
        requests.push(request);
        self.entries.insert(
            REGISTER_REQUESTS_KEY.to_string(),
            serde_json::to_string(&requests)?,
        );
        Ok(())
    }

    /// The registered requests, in append order; empty when none were added.
    pub fn data_requests(&self) -> PlannerResult<Vec<RegisterDataRequest>> {
        match self.entries.get(REGISTER_REQUESTS_KEY) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Stores the hint; a negative value fails without writing anything.
    pub fn set_max_map_hint(&mut self, hint: i64) -> PlannerResult<()> {
        if hint < 0 {
            return Err(PlannerError::InvalidHint(hint.to_string()));
        }
        self.entries
            .insert(MAX_MAP_HINT_KEY.to_string(), hint.to_string());
        Ok(())
    }

    /// The stored hint; 0 when unset. A negative or non-numeric stored
    /// value (written through raw [`set`](Self::set)) fails here.
    pub fn max_map_hint(&self) -> PlannerResult<usize> {
        let Some(raw) = self.entries.get(MAX_MAP_HINT_KEY) else {
            return Ok(0);
        };
        raw.parse::<i64>()
            .ok()
            .and_then(|hint| usize::try_from(hint).ok())
            .ok_or_else(|| PlannerError::InvalidHint(raw.clone()))
    }

    pub fn set_serialiser(&mut self, descriptor: &SerialiserDescriptor) -> PlannerResult<()> {
        self.entries
            .insert(SERIALISER_KEY.to_string(), serde_json::to_string(descriptor)?);
        Ok(())
    }

    pub fn serialiser(&self) -> PlannerResult<Option<SerialiserDescriptor>> {
        match self.entries.get(SERIALISER_KEY) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}
