//! Presentation layer for blueprint
//!
//! This crate contains CLI definitions, console status output, the drafting
//! spinner and run summary formatters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, Coordinate, DemoKind, OutputFormat, RegionArgs};
pub use output::console::ConsoleNotifier;
pub use output::formatter::{
    BuildSummary, JsonFormatter, OutputFormatter, PlacedCell, SummaryOutcome, TextFormatter,
    formatter_for,
};
pub use progress::reporter::DraftingSpinners;
