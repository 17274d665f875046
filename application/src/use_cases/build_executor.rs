//! Build executor.
//!
//! Applies validated plans to world storage a fixed number of placements per
//! tick. All calls happen on the tick thread; the executor owns its jobs and
//! borrows the host, notifier and lease table only for the duration of a tick.

use crate::config::ExecutorSettings;
use crate::ports::status::{StatusEvent, StatusNotifier};
use crate::ports::world::WorldHost;
use blueprint_domain::{
    ActorId, BlockOp, BuildJob, JobLock, LeaseToken, OperationTarget, Point3, WorldId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a running job was stopped. Already applied placements stay in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildAbort {
    #[error("build halted, chunk not loaded near {position}")]
    StorageUnavailable { position: Point3, applied: usize },

    #[error("unknown block id {target}")]
    UnknownTarget {
        target: OperationTarget,
        index: usize,
    },
}

/// Terminal state of a job, reported by [`BuildExecutor::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Completed { actor: ActorId, applied: usize },
    Aborted { actor: ActorId, abort: BuildAbort },
    /// The actor went away; the job was dropped without further writes.
    Discarded { actor: ActorId, applied: usize },
}

impl BuildOutcome {
    pub fn actor(&self) -> &ActorId {
        match self {
            BuildOutcome::Completed { actor, .. }
            | BuildOutcome::Aborted { actor, .. }
            | BuildOutcome::Discarded { actor, .. } => actor,
        }
    }
}

/// Per-actor, tick-budgeted build queue.
pub struct BuildExecutor {
    settings: ExecutorSettings,
    jobs: BTreeMap<ActorId, BuildJob>,
}

impl BuildExecutor {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self {
            settings,
            jobs: BTreeMap::new(),
        }
    }

    /// Register a job holding `lease`. Fails if the actor already has one
    /// running.
    pub fn submit(
        &mut self,
        actor: ActorId,
        world: WorldId,
        origin: Point3,
        ops: impl Into<Arc<[BlockOp]>>,
        lease: LeaseToken,
        now: Instant,
    ) -> bool {
        if self.jobs.contains_key(&actor) {
            return false;
        }
        let job = BuildJob::new(actor.clone(), world, origin, ops, now).with_lease(lease);
        debug!("Queued build for {} ({} ops at {})", actor, job.total(), origin);
        self.jobs.insert(actor, job);
        true
    }

    pub fn job(&self, actor: &ActorId) -> Option<&BuildJob> {
        self.jobs.get(actor)
    }

    pub fn is_building(&self, actor: &ActorId) -> bool {
        self.jobs.contains_key(actor)
    }

    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Advance every active job by up to `blocks_per_tick` placements.
    ///
    /// Jobs that reach a terminal state release the lease they were
    /// submitted with and are returned as outcomes.
    pub fn tick(
        &mut self,
        host: &mut dyn WorldHost,
        notifier: &dyn StatusNotifier,
        lock: &mut JobLock,
        now: Instant,
    ) -> Vec<BuildOutcome> {
        let budget = self.settings.blocks_per_tick;
        let progress_interval = self.settings.progress_interval;
        let mut outcomes = Vec::new();

        self.jobs.retain(|actor, job| {
            let Some(outcome) = step(job, host, notifier, budget, progress_interval, now) else {
                return true;
            };
            match &outcome {
                BuildOutcome::Completed { applied, .. } => {
                    info!("Build for {} complete: {} blocks", actor, applied);
                }
                BuildOutcome::Aborted { abort, .. } => {
                    warn!("Build for {} aborted: {}", actor, abort);
                }
                BuildOutcome::Discarded { applied, .. } => {
                    info!("Build for {} discarded after {} blocks", actor, applied);
                }
            }
            if let Some(lease) = job.lease()
                && !lock.release(actor, lease)
            {
                debug!("Lease for {} was already gone", actor);
            }
            outcomes.push(outcome);
            false
        });

        outcomes
    }
}

/// Run one tick of a single job. `Some` when the job is finished.
fn step(
    job: &mut BuildJob,
    host: &mut dyn WorldHost,
    notifier: &dyn StatusNotifier,
    budget: usize,
    progress_interval: std::time::Duration,
    now: Instant,
) -> Option<BuildOutcome> {
    let actor = job.actor().clone();
    if !host.is_online(&actor) {
        return Some(BuildOutcome::Discarded {
            applied: job.applied(),
            actor,
        });
    }

    let abort = match host.world_mut(job.world()) {
        Some(world) => {
            let mut abort = None;
            for _ in 0..budget {
                let Some((op, position)) = job.peek() else {
                    break;
                };
                if !world.is_loaded(position) {
                    abort = Some(BuildAbort::StorageUnavailable {
                        position,
                        applied: job.applied(),
                    });
                    break;
                }
                let Some(state) = world.resolve(&op.target) else {
                    abort = Some(BuildAbort::UnknownTarget {
                        target: op.target.clone(),
                        index: job.cursor(),
                    });
                    break;
                };
                world.set_cell(position, state);
                job.advance();
            }
            abort
        }
        None => Some(BuildAbort::StorageUnavailable {
            position: job.peek().map_or(job.origin(), |(_, position)| position),
            applied: job.applied(),
        }),
    };

    if let Some(abort) = abort {
        notifier.notify(&actor, &StatusEvent::BuildAborted(abort.clone()));
        return Some(BuildOutcome::Aborted { actor, abort });
    }

    if job.progress_due(now, progress_interval) {
        notifier.notify(
            &actor,
            &StatusEvent::Progress {
                applied: job.applied(),
                total: job.total(),
            },
        );
        job.mark_progress(now);
    }

    if job.is_finished() {
        notifier.notify(
            &actor,
            &StatusEvent::BuildComplete {
                applied: job.applied(),
            },
        );
        return Some(BuildOutcome::Completed {
            applied: job.applied(),
            actor,
        });
    }
    None
}
