//! reqwest-backed [`PlanGateway`].

use super::endpoints::{WebhookEndpoint, parse_http};
use crate::config::FileGeneratorConfig;
use async_trait::async_trait;
use blueprint_application::{GatewayError, GatewayResponse, PlanGateway};
use blueprint_domain::PlanRequest;
use reqwest::{Client, RequestBuilder, header};
use std::time::Duration;
use tracing::debug;

/// Gateway that POSTs generation requests to a webhook and polls runs.
pub struct HttpPlanGateway {
    client: Client,
    endpoint: Option<WebhookEndpoint>,
    request_timeout: Duration,
    poll_timeout: Duration,
}

impl HttpPlanGateway {
    pub fn new(
        endpoint: Option<WebhookEndpoint>,
        request_timeout: Duration,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            request_timeout,
            poll_timeout,
        }
    }

    /// Build from the `[generator]` section. A missing webhook yields an
    /// unconfigured gateway that can still import plans.
    pub fn from_config(config: &FileGeneratorConfig) -> Result<Self, GatewayError> {
        let endpoint = config
            .webhook()
            .map(|webhook| WebhookEndpoint::parse(webhook, config.poll_base_url.as_deref()))
            .transpose()?;
        Ok(Self::new(
            endpoint,
            config.request_timeout(),
            config.poll_timeout(),
        ))
    }

    fn endpoint(&self) -> Result<&WebhookEndpoint, GatewayError> {
        self.endpoint.as_ref().ok_or(GatewayError::NotConfigured)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<GatewayResponse, GatewayError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        Ok(GatewayResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(timeout)
    } else {
        GatewayError::Connection(err.to_string())
    }
}

#[async_trait]
impl PlanGateway for HttpPlanGateway {
    async fn submit(&self, request: &PlanRequest) -> Result<GatewayResponse, GatewayError> {
        let endpoint = self.endpoint()?;
        let builder = self
            .client
            .post(endpoint.webhook().clone())
            .json(request);
        self.send(builder, self.request_timeout).await
    }

    async fn poll(&self, run_id: &str) -> Result<GatewayResponse, GatewayError> {
        let endpoint = self.endpoint()?;
        let url = endpoint.poll_url(run_id);
        debug!("Polling {}{}", url.host_str().unwrap_or_default(), url.path());
        let mut builder = self
            .client
            .get(url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(api_key) = endpoint.api_key() {
            builder = builder.bearer_auth(api_key);
        }
        self.send(builder, self.poll_timeout).await
    }

    async fn fetch(&self, url: &str) -> Result<GatewayResponse, GatewayError> {
        let url = parse_http(url)?;
        self.send(self.client.get(url), self.poll_timeout).await
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}
