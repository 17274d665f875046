//! `[executor]` section

use blueprint_application::ExecutorSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutorConfig {
    /// Placements per job per tick
    pub blocks_per_tick: usize,
    pub progress_interval_ms: u64,
    /// Lifetime of a per-actor lease in seconds
    pub lease_ttl_secs: u64,
}

impl Default for FileExecutorConfig {
    fn default() -> Self {
        Self {
            blocks_per_tick: 20,
            progress_interval_ms: 1000,
            lease_ttl_secs: 300,
        }
    }
}

impl FileExecutorConfig {
    pub fn to_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            blocks_per_tick: self.blocks_per_tick,
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            lease_ttl: Duration::from_secs(self.lease_ttl_secs),
        }
    }
}
