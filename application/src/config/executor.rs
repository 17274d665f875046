//! Build execution parameters.

use blueprint_domain::DEFAULT_LEASE_TTL;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Placements applied per job per tick.
    pub blocks_per_tick: usize,
    /// Minimum wall-clock gap between two progress reports of a job.
    pub progress_interval: Duration,
    /// Lifetime of a per-actor lease.
    pub lease_ttl: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            blocks_per_tick: 20,
            progress_interval: Duration::from_millis(1000),
            lease_ttl: DEFAULT_LEASE_TTL,
        }
    }
}

impl ExecutorSettings {
    pub fn with_blocks_per_tick(mut self, blocks: usize) -> Self {
        self.blocks_per_tick = blocks;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
