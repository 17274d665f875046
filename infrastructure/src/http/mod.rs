//! HTTP adapter for the plan generator.

pub mod endpoints;
pub mod gateway;

pub use endpoints::{POLL_PATH, WebhookEndpoint};
pub use gateway::HttpPlanGateway;
