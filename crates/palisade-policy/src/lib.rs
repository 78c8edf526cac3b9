//! Palisade Policy - the hierarchical policy resolver
//!
//! Policies attach at either the resource or the data-type level. The rules
//! for a leaf are the data-type rules, then the rules of each ancestor from
//! the top of the hierarchy down, then the leaf's own, merged in that order.
//! A negation entry anywhere down the chain removes inherited rules by name.

#![deny(unsafe_code)]

mod error;
mod resolver;
pub mod rules;

pub use error::{PolicyError, PolicyResult};
pub use resolver::{
    GetPolicyRequest, HierarchicalPolicyResolver, HierarchicalPolicyResolverBuilder,
    PolicyResolver, DATA_TYPE_POLICY_PREFIX, RESOURCE_POLICY_PREFIX,
};
