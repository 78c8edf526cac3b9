//! Request context carried end-to-end
//!
//! The justification is mandatory and auditable; everything else is opaque
//! key/value metadata that rules may inspect.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-request context: the stated justification plus opaque metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Human-readable reason the user claims for access
    pub justification: String,

    /// Opaque metadata visible to rules
    #[serde(default)]
    pub contents: BTreeMap<String, Value>,
}

impl Context {
    pub fn new(justification: impl Into<String>) -> Self {
        Self {
            justification: justification.into(),
            contents: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.contents.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.contents.get(key)
    }

    /// A context is usable only when the justification is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.justification.trim().is_empty()
    }
}
