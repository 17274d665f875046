//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod acquire_plan;
pub mod build_executor;
pub mod coordinator;
pub mod plan_request;
