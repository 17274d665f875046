//! `[generator]` section: where plans come from and how long to wait for them.

use blueprint_application::GeneratorSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plan generator configuration
///
/// # Example
///
/// ```toml
/// [generator]
/// webhook_url = "https://hooks.example.com/plan?user_id=u1&api_key=k1"
/// poll_interval_ms = 1000
/// max_poll_attempts = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeneratorConfig {
    /// Endpoint receiving the generation POST. Also read from `PLAN_WEBHOOK_URL`.
    pub webhook_url: Option<String>,
    /// Scheme and host for run polling; defaults to the webhook's own.
    pub poll_base_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Per-attempt timeout for polls and plan imports.
    pub poll_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// 0 disables polling: run references are reported as errors.
    pub max_poll_attempts: u32,
    pub max_operations: usize,
    pub max_context_blocks: usize,
    pub default_build_height: i32,
    pub max_region_size: i32,
    pub body_preview_chars: usize,
}

impl Default for FileGeneratorConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            poll_base_url: None,
            request_timeout_secs: 20,
            poll_timeout_secs: 15,
            poll_interval_ms: 1000,
            max_poll_attempts: 120,
            max_operations: 600,
            max_context_blocks: 500,
            default_build_height: 12,
            max_region_size: 32,
            body_preview_chars: 240,
        }
    }
}

impl FileGeneratorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// The webhook URL, ignoring a blank value.
    pub fn webhook(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Application settings; the palette comes from its own section.
    pub fn to_settings(&self, palette: blueprint_domain::Palette) -> GeneratorSettings {
        GeneratorSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts,
            max_operations: self.max_operations,
            max_context_blocks: self.max_context_blocks,
            default_build_height: self.default_build_height,
            max_region_size: self.max_region_size,
            body_preview_chars: self.body_preview_chars,
            palette,
        }
    }
}
