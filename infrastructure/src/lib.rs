//! Infrastructure layer for blueprint
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod demo;
pub mod http;
pub mod world;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileExecutorConfig, FileGeneratorConfig,
    FilePaletteConfig,
};
pub use demo::{DemoPlanGateway, DemoScenario};
pub use http::{HttpPlanGateway, WebhookEndpoint};
pub use world::{MemoryHost, MemoryWorld};
