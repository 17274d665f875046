//! Acquire Plan use case.
//!
//! Drives one plan acquisition from request to a validated [`Plan`]:
//!
//! ```text
//! Sending ─┬─> Completed
//!          ├─> Failed
//!          └─> Polling ─┬─> Completed
//!                       ├─> Failed
//!                       └─> TimedOut
//! ```
//!
//! The use case runs on the async runtime and touches neither world storage
//! nor the lease table; its result is handed back to the tick thread by the
//! [`BuildCoordinator`](super::coordinator::BuildCoordinator).

use crate::config::GeneratorSettings;
use crate::ports::plan_gateway::{GatewayError, GatewayResponse, PlanGateway};
use blueprint_domain::util::preview;
use blueprint_domain::{
    Plan, PlanError, PlanRequest, RequestId, Size3, extract_run_id, find_plan, is_run_metadata,
    validate_plan,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why an acquisition ended without a plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquisitionError {
    #[error("generator request failed: {0}")]
    Transport(String),

    #[error("generator returned status {0}")]
    UpstreamStatus(u16),

    #[error("{}", plan_not_found_message(.preview, .run_metadata))]
    PlanNotFound { preview: String, run_metadata: bool },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("generator run failed")]
    UpstreamJobFailed,

    #[error("generator run timed out waiting for outputs after {attempts} polls")]
    TimedOut { attempts: u32 },
}

fn plan_not_found_message(preview: &str, run_metadata: &bool) -> String {
    if *run_metadata {
        "generator returned run metadata (run_id/url) instead of a plan. \
         Return the plan from an output step, or enable synchronous responses"
            .to_string()
    } else {
        format!("could not find build plan in response. Body preview: {}", preview)
    }
}

/// Where the plan document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    /// POST a generation request; may be answered with a run reference.
    Generate(PlanRequest),
    /// GET a finished plan document. Never polls.
    Import(String),
}

impl PlanSource {
    /// An import source, if `source` is an http(s) URL.
    pub fn import(source: &str) -> Option<Self> {
        let trimmed = source.trim();
        let (scheme, rest) = trimmed.split_once("://")?;
        let is_http = scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https");
        if !is_http || rest.is_empty() {
            return None;
        }
        Some(PlanSource::Import(trimmed.to_string()))
    }
}

/// Input for the [`AcquirePlanUseCase`].
#[derive(Debug, Clone)]
pub struct AcquirePlanInput {
    pub request_id: RequestId,
    pub source: PlanSource,
    /// Size the plan is validated against.
    pub target_size: Size3,
}

/// States of one acquisition. Every run ends in exactly one terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionState {
    Sending,
    Polling { run_id: String, attempt: u32 },
    Completed(Plan),
    Failed(AcquisitionError),
    TimedOut { attempts: u32 },
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionState::Completed(_)
                | AcquisitionState::Failed(_)
                | AcquisitionState::TimedOut { .. }
        )
    }
}

/// Result of interpreting a single poll response.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Nothing conclusive yet; schedule the next attempt.
    Pending,
    Finished(AcquisitionState),
}

/// Use case for acquiring a validated plan.
#[derive(Clone)]
pub struct AcquirePlanUseCase {
    gateway: Arc<dyn PlanGateway>,
    settings: GeneratorSettings,
}

impl AcquirePlanUseCase {
    pub fn new(gateway: Arc<dyn PlanGateway>, settings: GeneratorSettings) -> Self {
        Self { gateway, settings }
    }

    /// Run the state machine to its terminal state.
    pub async fn execute(&self, input: AcquirePlanInput) -> Result<Plan, AcquisitionError> {
        let request_id = &input.request_id;
        let polling = matches!(input.source, PlanSource::Generate(_))
            && self.settings.polling_enabled();
        let started = Instant::now();

        let mut state = AcquisitionState::Sending;
        loop {
            state = match state {
                AcquisitionState::Sending => {
                    let response = match &input.source {
                        PlanSource::Generate(request) => {
                            info!(
                                "{} -> sending request (size={}, contextBlocks={})",
                                request_id,
                                request.size,
                                request.context.as_ref().map_or(0, |c| c.operations.len())
                            );
                            self.gateway.submit(request).await
                        }
                        PlanSource::Import(url) => {
                            info!("{} -> fetching plan from {}", request_id, url);
                            self.gateway.fetch(url).await
                        }
                    };
                    let elapsed_ms = started.elapsed().as_millis();
                    match response {
                        Ok(response) => {
                            info!(
                                "{} -> status={} in {}ms (bodyLen={})",
                                request_id,
                                response.status,
                                elapsed_ms,
                                response.body.len()
                            );
                            self.interpret_submission(
                                request_id,
                                &response,
                                input.target_size,
                                polling,
                            )
                        }
                        Err(e) => {
                            error!(
                                "{} -> request failed after {}ms: {}",
                                request_id, elapsed_ms, e
                            );
                            AcquisitionState::Failed(AcquisitionError::Transport(e.to_string()))
                        }
                    }
                }
                AcquisitionState::Polling { run_id, attempt } => {
                    if attempt >= self.settings.max_poll_attempts {
                        AcquisitionState::TimedOut { attempts: attempt }
                    } else {
                        let result = self.gateway.poll(&run_id).await;
                        match self.interpret_poll(request_id, attempt, result, input.target_size) {
                            PollStep::Finished(next) => next,
                            PollStep::Pending => {
                                tokio::time::sleep(self.settings.poll_interval).await;
                                AcquisitionState::Polling {
                                    run_id,
                                    attempt: attempt + 1,
                                }
                            }
                        }
                    }
                }
                AcquisitionState::Completed(plan) => {
                    info!(
                        "{} -> plan validated: {} ops in {}ms",
                        request_id,
                        plan.len(),
                        started.elapsed().as_millis()
                    );
                    return Ok(plan);
                }
                AcquisitionState::Failed(err) => {
                    warn!("{} -> failed: {}", request_id, err);
                    return Err(err);
                }
                AcquisitionState::TimedOut { attempts } => {
                    warn!("{} -> timed out after {} polls", request_id, attempts);
                    return Err(AcquisitionError::TimedOut { attempts });
                }
            };
        }
    }

    /// Interpret the response to the initial request.
    ///
    /// A run reference is only followed when `polling` is set; otherwise the
    /// body must contain the plan itself.
    pub fn interpret_submission(
        &self,
        request_id: &RequestId,
        response: &GatewayResponse,
        target: Size3,
        polling: bool,
    ) -> AcquisitionState {
        let body_preview = || preview(&response.body, self.settings.body_preview_chars);

        if !response.is_success() {
            warn!("{} -> non-2xx response: {}", request_id, body_preview());
            return AcquisitionState::Failed(AcquisitionError::UpstreamStatus(response.status));
        }

        let root = serde_json::from_str::<Value>(&response.body).ok();

        if polling && let Some(run_id) = root.as_ref().and_then(extract_run_id) {
            info!("{} -> received run_id {}, polling for outputs", request_id, run_id);
            return AcquisitionState::Polling { run_id, attempt: 0 };
        }

        match root.as_ref().and_then(find_plan) {
            Some(plan_doc) => self.validate(request_id, &plan_doc, target),
            None => {
                warn!("{} -> missing plan JSON. Body preview: {}", request_id, body_preview());
                AcquisitionState::Failed(AcquisitionError::PlanNotFound {
                    preview: body_preview(),
                    run_metadata: root.as_ref().is_some_and(is_run_metadata),
                })
            }
        }
    }

    /// Interpret one poll attempt.
    ///
    /// Transport errors, non-2xx statuses, unparseable or non-object bodies
    /// and bodies without an extractable plan are all transient.
    pub fn interpret_poll(
        &self,
        request_id: &RequestId,
        attempt: u32,
        result: Result<GatewayResponse, GatewayError>,
        target: Size3,
    ) -> PollStep {
        let response = match result {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!(
                    "{} -> poll attempt {} returned status {}",
                    request_id, attempt, response.status
                );
                return PollStep::Pending;
            }
            Err(e) => {
                warn!("{} -> poll attempt {} failed: {}", request_id, attempt, e);
                return PollStep::Pending;
            }
        };

        let Ok(root) = serde_json::from_str::<Value>(&response.body) else {
            return PollStep::Pending;
        };
        if !root.is_object() {
            return PollStep::Pending;
        }

        let failed = root
            .get("state")
            .and_then(Value::as_str)
            .is_some_and(|state| state.eq_ignore_ascii_case("FAILED"));
        if failed {
            return PollStep::Finished(AcquisitionState::Failed(
                AcquisitionError::UpstreamJobFailed,
            ));
        }

        match root.get("outputs").filter(|outputs| !outputs.is_null()).and_then(find_plan) {
            Some(plan_doc) => PollStep::Finished(self.validate(request_id, &plan_doc, target)),
            None => {
                debug!("{} -> poll attempt {}: no outputs yet", request_id, attempt);
                PollStep::Pending
            }
        }
    }

    fn validate(&self, request_id: &RequestId, plan_doc: &Value, target: Size3) -> AcquisitionState {
        match validate_plan(
            plan_doc,
            target,
            &self.settings.palette,
            self.settings.max_operations,
        ) {
            Ok(plan) => AcquisitionState::Completed(plan),
            Err(e) => {
                warn!("{} -> validation failed: {}", request_id, e);
                AcquisitionState::Failed(e.into())
            }
        }
    }
}
