//! Status lines and run summaries

pub mod console;
pub mod formatter;
