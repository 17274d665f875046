//! Configuration file loading for blueprint
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `BLUEPRINT_<SECTION>__<KEY>`
//! 2. `PLAN_WEBHOOK_URL` for `generator.webhook_url`
//! 3. `--config <path>` specified file
//! 4. Project root: `./blueprint.toml` or `./.blueprint.toml`
//! 5. Global: `$XDG_CONFIG_HOME/blueprint/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileExecutorConfig, FileGeneratorConfig,
    FilePaletteConfig,
};
pub use loader::ConfigLoader;
