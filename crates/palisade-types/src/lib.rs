//! Palisade Types - Core types for the data-access control plane
//!
//! Palisade sits between analytic clients and the underlying data stores.
//! A client registers a request to read a named resource under a stated user
//! identity and justification; Palisade resolves the concrete resources,
//! evaluates hierarchical policy, and hands back redeemable descriptors.
//!
//! ## Key Concepts
//!
//! - **User**: an identity with authorisations and roles
//! - **Context**: request metadata carried end-to-end, including the
//!   mandatory justification
//! - **Resource**: the hierarchy of roots, directories, and data-bearing
//!   leaves
//! - **Rules / Policy**: ordered, named predicate chains attached at the
//!   resource or data-type level
//! - **RegisterDataRequest / DataRequestResponse**: the registration
//!   round-trip, keyed by a freshly minted request token

#![deny(unsafe_code)]

pub mod context;
pub mod ids;
pub mod request;
pub mod resource;
pub mod rule;
pub mod user;

// Re-export main types
pub use context::Context;
pub use ids::{RequestToken, ResourceId, UserId};
pub use request::{ConnectionDetail, DataRequestResponse, RegisterDataRequest, ResourceMap};
pub use resource::{LeafResource, Resource};
pub use rule::{Policy, Record, Rule, RuleEntry, Rules, NO_RULES_SET};
pub use user::User;
