//! Application layer for blueprint
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutorSettings, GeneratorSettings};
pub use ports::{
    plan_gateway::{GatewayError, GatewayResponse, PlanGateway},
    status::{NoStatus, StatusEvent, StatusNotifier},
    world::{WorldHost, WorldStorage},
};
pub use use_cases::acquire_plan::{
    AcquirePlanInput, AcquirePlanUseCase, AcquisitionError, AcquisitionState, PlanSource,
    PollStep,
};
pub use use_cases::build_executor::{BuildAbort, BuildExecutor, BuildOutcome};
pub use use_cases::coordinator::{BuildCoordinator, CornerEvent, StartBuildError};
pub use use_cases::plan_request::{build_plan_request, capture_context, effective_build_size};
