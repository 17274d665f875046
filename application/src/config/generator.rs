//! Plan acquisition parameters.

use blueprint_domain::Palette;
use std::time::Duration;

/// Parameters for building generation requests and acquiring plans.
///
/// Timeouts of individual HTTP calls belong to the gateway adapter; this
/// struct only carries what the use cases themselves decide on.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Delay between two poll attempts of an asynchronous run.
    pub poll_interval: Duration,
    /// Poll attempts before giving up. Zero disables polling entirely.
    pub max_poll_attempts: u32,
    /// Upper bound on `ops` in an accepted plan; also sent as `maxBlocks`.
    pub max_operations: usize,
    /// Cap on the context snapshot sent along with a request.
    pub max_context_blocks: usize,
    /// Height used when the build selection is a flat footprint.
    pub default_build_height: i32,
    /// Largest allowed selection extent on any axis.
    pub max_region_size: i32,
    /// Characters of an upstream body kept for diagnostics.
    pub body_preview_chars: usize,
    /// Allowed operation targets.
    pub palette: Palette,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            max_poll_attempts: 120,
            max_operations: 600,
            max_context_blocks: 500,
            default_build_height: 12,
            max_region_size: 32,
            body_preview_chars: 240,
            palette: Palette::default(),
        }
    }
}

impl GeneratorSettings {
    // ==================== Builder Methods ====================

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_max_operations(mut self, max: usize) -> Self {
        self.max_operations = max;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Whether a run reference should be followed by polling.
    pub fn polling_enabled(&self) -> bool {
        self.max_poll_attempts > 0
    }
}
