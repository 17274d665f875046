//! Domain layer for blueprint
//!
//! This crate contains the core types and pure logic. It has no dependencies
//! on I/O, async runtimes or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Region selection**: two corners defining an inclusive box
//! - **Plan**: an ordered list of placements produced by an external generator,
//!   trusted only after [`validate_plan`]
//! - **Lease**: per-actor exclusivity token with a TTL ([`JobLock`])
//! - **Build job**: a resumable cursor over a plan's placements ([`BuildJob`])

pub mod build;
pub mod core;
pub mod lease;
pub mod plan;
pub mod selection;
pub mod util;

// Re-export commonly used types
pub use build::job::BuildJob;
pub use core::{
    cell::{CellState, EMPTY_CELL},
    geometry::{Point3, Size3},
    ids::{ActorId, RequestId, WorldId},
};
pub use lease::job_lock::{DEFAULT_LEASE_TTL, JobLease, JobLock, LeaseToken};
pub use plan::{
    entities::{BlockOp, DEFAULT_PALETTE, OperationTarget, Palette, Plan, PlanMeta},
    extract::{MAX_UNWRAP_DEPTH, extract_run_id, find_plan, is_run_metadata},
    request::{PlanContext, PlanRequest},
    tree::{DocumentTree, Node},
    validator::{OperationFault, PlanError, validate_plan},
};
pub use selection::{
    codec::{SelectionCodecError, SelectionUpdate},
    region::{CornerSlot, RegionSelection, SelectionKind},
    table::SelectionTable,
};
