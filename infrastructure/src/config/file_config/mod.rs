//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application settings.

mod executor;
mod generator;
mod palette;

pub use executor::FileExecutorConfig;
pub use generator::FileGeneratorConfig;
pub use palette::FilePaletteConfig;

use blueprint_application::{ExecutorSettings, GeneratorSettings};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    Zero(&'static str),

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("palette.blocks cannot be empty")]
    EmptyPalette,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Plan generator settings
    pub generator: FileGeneratorConfig,
    /// Build execution settings
    pub executor: FileExecutorConfig,
    /// Allowed operation targets
    pub palette: FilePaletteConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        let generator = &self.generator;
        let executor = &self.executor;

        let counts = [
            ("generator.request_timeout_secs", generator.request_timeout_secs),
            ("generator.poll_timeout_secs", generator.poll_timeout_secs),
            ("generator.poll_interval_ms", generator.poll_interval_ms),
            ("generator.max_operations", generator.max_operations as u64),
            ("generator.max_region_size", generator.max_region_size.max(0) as u64),
            ("generator.default_build_height", generator.default_build_height.max(0) as u64),
            ("executor.blocks_per_tick", executor.blocks_per_tick as u64),
            ("executor.progress_interval_ms", executor.progress_interval_ms),
            ("executor.lease_ttl_secs", executor.lease_ttl_secs),
        ];
        issues.extend(
            counts
                .into_iter()
                .filter(|(_, value)| *value == 0)
                .map(|(field, _)| ConfigValidationError::Zero(field)),
        );

        let urls = [
            ("generator.webhook_url", generator.webhook()),
            ("generator.poll_base_url", generator.poll_base_url.as_deref()),
        ];
        for (field, value) in urls {
            if let Some(value) = value
                && !is_http_url(value)
            {
                issues.push(ConfigValidationError::InvalidUrl {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if self.palette.to_palette().is_empty() {
            issues.push(ConfigValidationError::EmptyPalette);
        }

        issues
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        self.generator.to_settings(self.palette.to_palette())
    }

    pub fn executor_settings(&self) -> ExecutorSettings {
        self.executor.to_settings()
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[generator]
webhook_url = "https://hooks.example.com/plan?user_id=u1&api_key=k1"
poll_interval_ms = 250
max_poll_attempts = 0
max_operations = 200

[executor]
blocks_per_tick = 50
lease_ttl_secs = 60

[palette]
blocks = ["minecraft:glass", "minecraft:torch", "minecraft:glass"]
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.generator.webhook(),
            Some("https://hooks.example.com/plan?user_id=u1&api_key=k1")
        );
        assert!(config.validate().is_empty());

        let generator = config.generator_settings();
        assert_eq!(generator.poll_interval, Duration::from_millis(250));
        assert!(!generator.polling_enabled());
        assert_eq!(generator.max_operations, 200);
        assert_eq!(generator.palette.len(), 2);
        // Untouched keys keep their defaults
        assert_eq!(generator.default_build_height, 12);

        let executor = config.executor_settings();
        assert_eq!(executor.blocks_per_tick, 50);
        assert_eq!(executor.lease_ttl, Duration::from_secs(60));
        assert_eq!(executor.progress_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.generator.webhook().is_none());
        assert_eq!(config.generator.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.generator.poll_timeout(), Duration::from_secs(15));
        assert_eq!(config.palette.blocks.len(), 17);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_blank_webhook_is_unset() {
        let config: FileConfig = toml::from_str("[generator]\nwebhook_url = \"  \"").unwrap();
        assert!(config.generator.webhook().is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let toml_str = r#"
[generator]
webhook_url = "ftp://hooks.example.com"
request_timeout_secs = 0

[executor]
blocks_per_tick = 0

[palette]
blocks = ["", "  "]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(
            issues,
            vec![
                ConfigValidationError::Zero("generator.request_timeout_secs"),
                ConfigValidationError::Zero("executor.blocks_per_tick"),
                ConfigValidationError::InvalidUrl {
                    field: "generator.webhook_url",
                    value: "ftp://hooks.example.com".to_string(),
                },
                ConfigValidationError::EmptyPalette,
            ]
        );
    }
}
