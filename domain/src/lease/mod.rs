//! Per-actor exclusivity leases.

pub mod job_lock;
