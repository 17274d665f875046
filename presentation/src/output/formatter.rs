//! Summary formatting for finished CLI runs

use crate::cli::commands::OutputFormat;
use colored::Colorize;
use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOutcome {
    Completed,
    Aborted,
    Failed,
    Rejected,
    Interrupted,
}

impl SummaryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SummaryOutcome::Completed)
    }
}

/// One non-empty cell of the world after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block: String,
}

/// Result of one `build`, `import` or `demo` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub request_id: Option<String>,
    pub outcome: SummaryOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub applied: usize,
    pub total: usize,
    pub elapsed_ms: u128,
    pub cells: Vec<PlacedCell>,
}

/// Trait for formatting run summaries
pub trait OutputFormatter {
    fn format(&self, summary: &BuildSummary) -> String;
}

/// Colored, human readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &BuildSummary) -> String {
        let mut output = String::new();

        let outcome = format!("{:?}", summary.outcome);
        let outcome = if summary.outcome.is_success() {
            outcome.green().bold()
        } else {
            outcome.red().bold()
        };
        output.push_str(&format!("{} {}\n", "Outcome:".cyan().bold(), outcome));

        if let Some(request_id) = &summary.request_id {
            output.push_str(&format!("{} {}\n", "Request:".cyan().bold(), request_id));
        }
        if let Some(message) = &summary.message {
            output.push_str(&format!("{} {}\n", "Reason:".cyan().bold(), message));
        }
        output.push_str(&format!(
            "{} {}/{} blocks in {} ms\n",
            "Placed:".cyan().bold(),
            summary.applied,
            summary.total,
            summary.elapsed_ms
        ));
        output.push_str(&format!(
            "{} {}\n",
            "World cells:".dimmed(),
            summary.cells.len()
        ));
        output
    }
}

/// Pretty JSON including every placed cell
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &BuildSummary) -> String {
        serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
