//! Palisade Coordinator - the registration façade
//!
//! One call does the whole dance: authenticate the user, expand the resource
//! name, filter by policy, mint a token, cache the record-level policy map
//! under it, and hand back the redeemable response.

#![deny(unsafe_code)]

mod config;
mod coordinator;
mod error;

pub use config::CoordinatorConfig;
pub use coordinator::{PalisadeCoordinator, PalisadeService};
pub use error::{CoordinatorError, CoordinatorResult};
