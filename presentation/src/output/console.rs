//! Console status output

use crate::progress::reporter::DraftingSpinners;
use blueprint_application::{StatusEvent, StatusNotifier};
use blueprint_domain::{ActorId, RequestId};
use colored::Colorize;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Record {
    lines: Vec<String>,
    last_error: Option<String>,
    planned: Option<usize>,
}

/// Prints status events as colored lines prefixed with the actor.
///
/// Also remembers the last error and the planned operation count so the CLI
/// can summarize a run after the coordinator goes idle.
pub struct ConsoleNotifier {
    spinners: Option<DraftingSpinners>,
    record: Mutex<Record>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            spinners: Some(DraftingSpinners::new()),
            record: Mutex::new(Record::default()),
        }
    }

    /// Plain lines only, no spinner.
    pub fn quiet() -> Self {
        Self {
            spinners: None,
            record: Mutex::new(Record::default()),
        }
    }

    fn record(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_error(&self) -> Option<String> {
        self.record().last_error.clone()
    }

    /// Operation count of the most recently started build.
    pub fn planned_operations(&self) -> Option<usize> {
        self.record().planned
    }

    /// Uncolored copy of every line printed so far.
    pub fn transcript(&self) -> Vec<String> {
        self.record().lines.clone()
    }

    fn render(actor: &ActorId, event: &StatusEvent) -> String {
        let prefix = format!("[{}]", actor).dimmed();
        let text = event.to_string();
        let body = match event {
            e if e.is_error() => text.red().bold(),
            StatusEvent::Warnings(_) => text.yellow(),
            StatusEvent::BuildComplete { .. } | StatusEvent::PlanValidated { .. } => {
                text.green()
            }
            StatusEvent::Progress { .. } => text.normal(),
            _ => text.cyan(),
        };
        format!("{} {}", prefix, body)
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusNotifier for ConsoleNotifier {
    fn notify(&self, actor: &ActorId, event: &StatusEvent) {
        {
            let mut record = self.record();
            record.lines.push(format!("[{}] {}", actor, event));
            if event.is_error() {
                record.last_error = Some(event.to_string());
            }
            if let StatusEvent::BuildStarted { operations } = event {
                record.planned = Some(*operations);
            }
        }

        let line = Self::render(actor, event);
        match &self.spinners {
            Some(spinners) => spinners.println(&line),
            None => println!("{}", line),
        }
    }

    fn drafting_started(&self, actor: &ActorId, request_id: &RequestId) {
        if let Some(spinners) = &self.spinners {
            spinners.start(actor, request_id);
        }
    }

    fn drafting_stopped(&self, actor: &ActorId) {
        if let Some(spinners) = &self.spinners {
            spinners.stop(actor);
        }
    }
}
