//! Palisade Resource - logical-name to concrete-leaf expansion
//!
//! A provider turns the resource name a client asked for into every concrete
//! leaf resource backing it, each paired with the connection detail for the
//! data node that serves it. Providers are pluggable; the in-memory provider
//! here is the development/testing backend.

#![deny(unsafe_code)]

mod error;
mod memory;
mod provider;

pub use error::{ResourceError, ResourceResult};
pub use memory::InMemoryResourceProvider;
pub use provider::ResourceProvider;
