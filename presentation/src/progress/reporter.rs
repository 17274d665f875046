//! Drafting indicator shown while a plan is being generated

use blueprint_domain::{ActorId, RequestId};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One spinner per actor with an acquisition in flight
pub struct DraftingSpinners {
    multi: MultiProgress,
    bars: Mutex<HashMap<ActorId, ProgressBar>>,
}

impl DraftingSpinners {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bars(&self) -> MutexGuard<'_, HashMap<ActorId, ProgressBar>> {
        self.bars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self, actor: &ActorId, request_id: &RequestId) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(actor.to_string());
        pb.set_message(format!("Drafting plan ({})", request_id));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.bars().insert(actor.clone(), pb) {
            previous.finish_and_clear();
        }
    }

    pub fn stop(&self, actor: &ActorId) {
        if let Some(pb) = self.bars().remove(actor) {
            pb.finish_and_clear();
        }
    }

    /// Print a line above any running spinners.
    pub fn println(&self, line: &str) {
        if self.bars().is_empty() || self.multi.println(line).is_err() {
            println!("{}", line);
        }
    }

    pub fn active(&self) -> usize {
        self.bars().len()
    }
}

impl Default for DraftingSpinners {
    fn default() -> Self {
        Self::new()
    }
}
