//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deployment-level knobs for the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How long a minted token's policy map stays redeemable, in seconds.
    /// Expiry is the sole deletion mechanism; reads never consume the map.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Deadline for each downstream call (cache, users, resources, policy),
    /// in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl CoordinatorConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

const fn default_token_ttl() -> u64 {
    600
}

const fn default_call_timeout() -> u64 {
    30
}
