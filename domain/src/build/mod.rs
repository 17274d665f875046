//! Build jobs: a resumable cursor over an immutable list of placements.

pub mod job;
