//! Palisade Cache - the shared key/value gateway
//!
//! Every durable piece of Palisade state (users, policy bindings, per-token
//! policy maps) lives behind this gateway, namespaced by the owning service
//! so keyspaces stay disjoint. Values are typed; the gateway owns how they
//! are stored and copied.

#![deny(unsafe_code)]

mod error;
mod memory;
mod service;

pub use error::{CacheError, CacheResult};
pub use memory::InMemoryCacheService;
pub use service::{CacheNamespace, CacheService, CachedValue};
