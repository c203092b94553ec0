//! # config
//!
//! why: tune how often and how patiently a follower pulls from its leader
//! relations: consumed by raft-follower when scheduling the puller
//! what: FollowerConfig with defaults and validation

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default period between pull cycles, in milliseconds
pub const DEFAULT_PULL_INTERVAL_MS: u64 = 1000;

/// Default deadline for a single pull request, in milliseconds
pub const DEFAULT_PULL_TIMEOUT_MS: u64 = 500;

/// Follower replication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    /// Period between pull cycles (ms)
    pub pull_interval_ms: u64,
    /// Deadline for one pull request before it counts as failed (ms)
    pub pull_timeout_ms: u64,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            pull_interval_ms: DEFAULT_PULL_INTERVAL_MS,
            pull_timeout_ms: DEFAULT_PULL_TIMEOUT_MS,
        }
    }
}

impl FollowerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pull_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.pull_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn pull_interval(&self) -> Duration {
        Duration::from_millis(self.pull_interval_ms)
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_millis(self.pull_timeout_ms)
    }
}
