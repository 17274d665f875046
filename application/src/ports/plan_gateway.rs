//! Plan gateway port
//!
//! Defines the interface for talking to the external plan generator.

use async_trait::async_trait;
use blueprint_domain::PlanRequest;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while reaching the generator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Gateway is not configured")]
    NotConfigured,
}

/// Raw HTTP outcome. Interpretation of the body is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Gateway for plan generation
///
/// Implementations (adapters) live in the infrastructure layer. Each call is
/// a single request bounded by the adapter's own timeout.
#[async_trait]
pub trait PlanGateway: Send + Sync {
    /// POST a generation request.
    async fn submit(&self, request: &PlanRequest) -> Result<GatewayResponse, GatewayError>;

    /// GET the status of an asynchronous run.
    async fn poll(&self, run_id: &str) -> Result<GatewayResponse, GatewayError>;

    /// GET a plan document from an arbitrary http(s) URL.
    async fn fetch(&self, url: &str) -> Result<GatewayResponse, GatewayError>;

    /// Whether `submit` has somewhere to send requests.
    fn is_configured(&self) -> bool {
        true
    }
}
