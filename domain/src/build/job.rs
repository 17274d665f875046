//! Resumable build cursor.

use crate::core::geometry::Point3;
use crate::core::ids::{ActorId, WorldId};
use crate::lease::job_lock::LeaseToken;
use crate::plan::entities::BlockOp;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One actor's in-progress build.
///
/// `ops` never changes after creation; progress is the `cursor` index into it,
/// so resuming on the next tick is just reading `ops[cursor]` again.
#[derive(Debug, Clone)]
pub struct BuildJob {
    actor: ActorId,
    world: WorldId,
    origin: Point3,
    ops: Arc<[BlockOp]>,
    cursor: usize,
    applied: usize,
    last_progress_at: Instant,
    lease: Option<LeaseToken>,
}

impl BuildJob {
    pub fn new(
        actor: ActorId,
        world: WorldId,
        origin: Point3,
        ops: impl Into<Arc<[BlockOp]>>,
        now: Instant,
    ) -> Self {
        Self {
            actor,
            world,
            origin,
            ops: ops.into(),
            cursor: 0,
            applied: 0,
            last_progress_at: now,
            lease: None,
        }
    }

    /// Attach the lease released when this job terminates.
    pub fn with_lease(mut self, lease: LeaseToken) -> Self {
        self.lease = Some(lease);
        self
    }

    pub fn lease(&self) -> Option<LeaseToken> {
        self.lease
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn total(&self) -> usize {
        self.ops.len()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.ops.len()
    }

    /// Next unapplied op and its absolute position.
    pub fn peek(&self) -> Option<(&BlockOp, Point3)> {
        let op = self.ops.get(self.cursor)?;
        Some((op, self.origin.offset(op.x, op.y, op.z)))
    }

    /// Record that the op under the cursor was written.
    pub fn advance(&mut self) {
        if self.cursor < self.ops.len() {
            self.cursor += 1;
            self.applied += 1;
        }
    }

    pub fn progress_due(&self, now: Instant, interval: Duration) -> bool {
        now.saturating_duration_since(self.last_progress_at) >= interval
    }

    pub fn mark_progress(&mut self, now: Instant) {
        self.last_progress_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(ops: Vec<BlockOp>) -> BuildJob {
        BuildJob::new(
            ActorId::new("alice"),
            WorldId::default(),
            Point3::new(100, 64, -20),
            ops,
            Instant::now(),
        )
    }

    #[test]
    fn test_peek_resolves_absolute_position() {
        let job = job(vec![BlockOp::new(1, 2, 3, "minecraft:glass")]);
        let (op, pos) = job.peek().unwrap();
        assert_eq!(op.target.as_str(), "minecraft:glass");
        assert_eq!(pos, Point3::new(101, 66, -17));
    }

    #[test]
    fn test_cursor_walks_ops_in_order() {
        let mut job = job(vec![
            BlockOp::new(0, 0, 0, "a"),
            BlockOp::new(1, 0, 0, "b"),
        ]);
        assert_eq!(job.peek().unwrap().0.target.as_str(), "a");
        job.advance();
        assert_eq!(job.peek().unwrap().0.target.as_str(), "b");
        job.advance();
        assert!(job.is_finished());
        assert!(job.peek().is_none());

        job.advance();
        assert_eq!(job.cursor(), 2);
        assert_eq!(job.applied(), 2);
    }

    #[test]
    fn test_empty_job_is_finished() {
        assert!(job(Vec::new()).is_finished());
    }

    #[test]
    fn test_progress_interval_is_wall_clock() {
        let start = Instant::now();
        let mut job = BuildJob::new(
            ActorId::new("a"),
            WorldId::default(),
            Point3::new(0, 0, 0),
            vec![BlockOp::new(0, 0, 0, "a")],
            start,
        );
        let second = Duration::from_secs(1);
        assert!(!job.progress_due(start + Duration::from_millis(999), second));
        assert!(job.progress_due(start + second, second));
        job.mark_progress(start + second);
        assert!(!job.progress_due(start + Duration::from_millis(1500), second));
    }
}
