//! Core domain concepts shared across all subdomains.
//!
//! - [`geometry::Point3`] / [`geometry::Size3`]: integer block coordinates and extents
//! - [`ids::ActorId`] / [`ids::WorldId`] / [`ids::RequestId`]: identifiers
//! - [`cell::CellState`]: a concrete value stored in one world cell

pub mod cell;
pub mod geometry;
pub mod ids;
