//! Application-level configuration.
//!
//! These types control how use cases behave:
//!
//! - [`GeneratorSettings`]: plan acquisition (polling cadence, caps, palette)
//! - [`ExecutorSettings`]: build execution (per-tick budget, progress cadence, lease TTL)

pub mod executor;
pub mod generator;

pub use executor::ExecutorSettings;
pub use generator::GeneratorSettings;
