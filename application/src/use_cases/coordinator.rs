//! Build coordinator.
//!
//! Owns all per-actor state that the tick thread mutates: selections, the
//! lease table and the build executor. Acquisitions run as tasks on the async
//! runtime and hand their results back over a channel that is drained at the
//! start of every [`tick`](BuildCoordinator::tick), so world storage and
//! leases are only ever touched from the thread that calls `tick`.

use super::acquire_plan::{AcquirePlanInput, AcquirePlanUseCase, AcquisitionError, PlanSource};
use super::build_executor::{BuildExecutor, BuildOutcome};
use super::plan_request::{build_plan_request, capture_context, effective_build_size};
use crate::config::{ExecutorSettings, GeneratorSettings};
use crate::ports::plan_gateway::PlanGateway;
use crate::ports::status::{StatusEvent, StatusNotifier};
use crate::ports::world::WorldHost;
use blueprint_domain::{
    ActorId, CornerSlot, JobLock, LeaseToken, Plan, Point3, RegionSelection, RequestId,
    SelectionKind, SelectionTable, SelectionUpdate, Size3, WorldId,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Reasons a build or import request is refused before any work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartBuildError {
    #[error("Build already in progress. Please wait.")]
    LockContention,

    #[error("you haven't selected a region yet. Select two corners first.")]
    NoSelection,

    #[error("selected region is too large (max {max}x{max}x{max}).")]
    RegionTooLarge { size: Size3, max: i32 },

    #[error("context region is too large (max {max}x{max}x{max}).")]
    ContextTooLarge { size: Size3, max: i32 },

    #[error("plan webhook URL is not set.")]
    MissingWebhook,

    #[error("plan source must be a valid http(s) URL.")]
    InvalidSource,
}

/// Result of a corner selection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerEvent {
    pub kind: SelectionKind,
    pub slot: CornerSlot,
    pub position: Point3,
    /// Record to mirror the selection to the actor's client.
    pub update: SelectionUpdate,
}

/// Everything needed to turn an acquired plan into a build.
#[derive(Debug, Clone)]
struct BuildTicket {
    actor: ActorId,
    world: WorldId,
    origin: Point3,
    request_id: RequestId,
    lease: LeaseToken,
    /// Whether a drafting indicator was started for this request.
    drafting: bool,
}

#[derive(Debug)]
struct AcquisitionReport {
    ticket: BuildTicket,
    outcome: Result<Plan, AcquisitionError>,
}

/// Tick-thread owner of selections, leases and builds.
pub struct BuildCoordinator {
    acquire: AcquirePlanUseCase,
    gateway: Arc<dyn PlanGateway>,
    notifier: Arc<dyn StatusNotifier>,
    settings: GeneratorSettings,
    selections: SelectionTable,
    lock: JobLock,
    executor: BuildExecutor,
    runtime: Handle,
    reports_tx: mpsc::UnboundedSender<AcquisitionReport>,
    reports_rx: mpsc::UnboundedReceiver<AcquisitionReport>,
    /// Actors with an acquisition started but not yet handed back.
    acquiring: HashSet<ActorId>,
}

impl BuildCoordinator {
    pub fn new(
        gateway: Arc<dyn PlanGateway>,
        notifier: Arc<dyn StatusNotifier>,
        settings: GeneratorSettings,
        executor_settings: ExecutorSettings,
        runtime: Handle,
    ) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            acquire: AcquirePlanUseCase::new(gateway.clone(), settings.clone()),
            gateway,
            notifier,
            settings,
            selections: SelectionTable::new(),
            lock: JobLock::new(executor_settings.lease_ttl),
            executor: BuildExecutor::new(executor_settings),
            runtime,
            reports_tx,
            reports_rx,
            acquiring: HashSet::new(),
        }
    }

    // ==================== Selections ====================

    /// Record a corner click (first sets A, second sets B, third restarts).
    pub fn select_corner(
        &mut self,
        actor: &ActorId,
        kind: SelectionKind,
        position: Point3,
    ) -> CornerEvent {
        let selection = self.selections.entry(actor, kind);
        let slot = selection.record_corner(position);
        let update = SelectionUpdate::new(kind, *selection);
        self.notifier.notify(
            actor,
            &StatusEvent::CornerSet {
                kind,
                slot,
                position,
            },
        );
        CornerEvent {
            kind,
            slot,
            position,
            update,
        }
    }

    pub fn clear_selection(&mut self, actor: &ActorId, kind: SelectionKind) -> SelectionUpdate {
        self.selections.clear(actor, kind);
        self.notifier
            .notify(actor, &StatusEvent::SelectionCleared(kind));
        SelectionUpdate::new(kind, RegionSelection::new())
    }

    pub fn selection(&self, actor: &ActorId, kind: SelectionKind) -> RegionSelection {
        self.selections.get_or_empty(actor, kind)
    }

    /// Drop everything held for a disconnected actor except running work,
    /// which winds down on its own.
    pub fn forget_actor(&mut self, actor: &ActorId) {
        self.selections.forget_actor(actor);
    }

    // ==================== Requests ====================

    /// Start generating a plan for the actor's build selection.
    ///
    /// On success the actor holds a lease until the acquisition fails or the
    /// resulting build terminates.
    pub fn request_build(
        &mut self,
        host: &dyn WorldHost,
        actor: &ActorId,
        world: &WorldId,
        prompt: &str,
    ) -> Result<RequestId, StartBuildError> {
        let (build, size) = self.admit(actor)?;
        if !self.gateway.is_configured() {
            return Err(self.reject(actor, StartBuildError::MissingWebhook));
        }

        let context_selection = self.selections.get_or_empty(actor, SelectionKind::Context);
        if let Some(size) = context_selection.size() {
            let max = self.settings.max_region_size;
            if size.max_component() > max {
                return Err(self.reject(actor, StartBuildError::ContextTooLarge { size, max }));
            }
        }
        let context = if context_selection.is_complete() {
            host.world(world).and_then(|storage| {
                capture_context(
                    storage,
                    &context_selection,
                    &self.settings.palette,
                    self.settings.max_context_blocks,
                )
            })
        } else {
            None
        };

        let Some(request) = build_plan_request(prompt, &build, context, &self.settings) else {
            return Err(self.reject(actor, StartBuildError::NoSelection));
        };
        let Some(lease) = self.lock.try_acquire(actor) else {
            return Err(self.reject(actor, StartBuildError::LockContention));
        };

        let request_id = RequestId::generate("req", actor, unix_millis());
        self.notifier.notify(
            actor,
            &StatusEvent::Drafting {
                prompt: prompt.to_string(),
            },
        );
        self.notifier.notify(actor, &StatusEvent::Footprint(size));
        if context_selection.is_complete() {
            self.notifier.notify(actor, &StatusEvent::ContextAttached);
        }
        self.notifier.drafting_started(actor, &request_id);

        let ticket = BuildTicket {
            actor: actor.clone(),
            world: world.clone(),
            origin: request.origin,
            request_id: request_id.clone(),
            lease,
            drafting: true,
        };
        self.spawn_acquisition(ticket, PlanSource::Generate(request), size);
        Ok(request_id)
    }

    /// Fetch a finished plan from `source` and build it in the actor's
    /// build selection.
    pub fn import_plan(
        &mut self,
        actor: &ActorId,
        world: &WorldId,
        source: &str,
    ) -> Result<RequestId, StartBuildError> {
        let (build, size) = self.admit(actor)?;
        let Some(source) = PlanSource::import(source) else {
            return Err(self.reject(actor, StartBuildError::InvalidSource));
        };
        let Some(origin) = build.min() else {
            return Err(self.reject(actor, StartBuildError::NoSelection));
        };
        let Some(lease) = self.lock.try_acquire(actor) else {
            return Err(self.reject(actor, StartBuildError::LockContention));
        };

        let request_id = RequestId::generate("paste", actor, unix_millis());
        self.notifier.notify(actor, &StatusEvent::FetchingPlan);

        let ticket = BuildTicket {
            actor: actor.clone(),
            world: world.clone(),
            origin,
            request_id: request_id.clone(),
            lease,
            drafting: false,
        };
        self.spawn_acquisition(ticket, source, size);
        Ok(request_id)
    }

    /// Checks shared by every request kind, in the order the actor sees them.
    fn admit(&mut self, actor: &ActorId) -> Result<(RegionSelection, Size3), StartBuildError> {
        if self.is_busy(actor) {
            return Err(self.reject(actor, StartBuildError::LockContention));
        }
        let build = self.selections.get_or_empty(actor, SelectionKind::Build);
        let Some(size) = build.size() else {
            return Err(self.reject(actor, StartBuildError::NoSelection));
        };
        let max = self.settings.max_region_size;
        if size.max_component() > max {
            return Err(self.reject(actor, StartBuildError::RegionTooLarge { size, max }));
        }
        let Some(effective) = effective_build_size(&build, self.settings.default_build_height)
        else {
            return Err(self.reject(actor, StartBuildError::NoSelection));
        };
        Ok((build, effective))
    }

    fn reject(&self, actor: &ActorId, err: StartBuildError) -> StartBuildError {
        debug!("Rejected request from {}: {}", actor, err);
        self.notifier
            .notify(actor, &StatusEvent::Rejected(err.clone()));
        err
    }

    fn spawn_acquisition(&mut self, ticket: BuildTicket, source: PlanSource, target_size: Size3) {
        let acquire = self.acquire.clone();
        let reports = self.reports_tx.clone();
        let input = AcquirePlanInput {
            request_id: ticket.request_id.clone(),
            source,
            target_size,
        };
        self.acquiring.insert(ticket.actor.clone());
        self.runtime.spawn(async move {
            let outcome = acquire.execute(input).await;
            // The receiver only goes away with the coordinator itself.
            let _ = reports.send(AcquisitionReport { ticket, outcome });
        });
    }

    // ==================== Tick ====================

    /// One host scheduling cycle: hand finished acquisitions to the executor,
    /// then advance every build.
    pub fn tick(&mut self, host: &mut dyn WorldHost, now: Instant) -> Vec<BuildOutcome> {
        while let Ok(report) = self.reports_rx.try_recv() {
            self.acquiring.remove(&report.ticket.actor);
            self.accept_report(host, report, now);
        }
        let expired = self.lock.purge_expired(now);
        if expired > 0 {
            warn!("Dropped {} expired lease(s)", expired);
        }
        self.executor
            .tick(host, self.notifier.as_ref(), &mut self.lock, now)
    }

    fn accept_report(&mut self, host: &dyn WorldHost, report: AcquisitionReport, now: Instant) {
        let AcquisitionReport { ticket, outcome } = report;
        let actor = &ticket.actor;
        if ticket.drafting {
            self.notifier.drafting_stopped(actor);
        }

        let plan = match outcome {
            Ok(plan) => plan,
            Err(error) => {
                self.notifier.notify(
                    actor,
                    &StatusEvent::AcquisitionFailed {
                        request_id: ticket.request_id.clone(),
                        error,
                    },
                );
                self.lock.release(actor, ticket.lease);
                return;
            }
        };

        if !host.is_online(actor) {
            info!("{} -> actor {} left before the build started", ticket.request_id, actor);
            self.lock.release(actor, ticket.lease);
            return;
        }

        self.notifier.notify(
            actor,
            &StatusEvent::PlanValidated {
                operations: plan.len(),
            },
        );
        if !plan.meta.warnings.is_empty() {
            self.notifier
                .notify(actor, &StatusEvent::Warnings(plan.meta.warnings.clone()));
        }

        let operations = plan.len();
        if self.executor.submit(
            actor.clone(),
            ticket.world.clone(),
            ticket.origin,
            plan.ops,
            ticket.lease,
            now,
        ) {
            self.notifier
                .notify(actor, &StatusEvent::BuildStarted { operations });
        } else {
            warn!("{} -> build already running for {}", ticket.request_id, actor);
            self.notifier.notify(
                actor,
                &StatusEvent::Rejected(StartBuildError::LockContention),
            );
            self.lock.release(actor, ticket.lease);
        }
    }

    // ==================== Queries ====================

    /// Acquisitions started but not yet handed back.
    pub fn in_flight(&self) -> usize {
        self.acquiring.len()
    }

    pub fn active_builds(&self) -> usize {
        self.executor.active_jobs()
    }

    pub fn is_idle(&self) -> bool {
        self.acquiring.is_empty() && self.executor.active_jobs() == 0
    }

    /// True while the actor holds a lease, waits on an acquisition or has a
    /// build running. An expired lease alone does not free an actor whose
    /// workflow is still active.
    pub fn is_busy(&mut self, actor: &ActorId) -> bool {
        self.lock.is_held(actor)
            || self.acquiring.contains(actor)
            || self.executor.is_building(actor)
    }
}

fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::plan_gateway::{GatewayError, GatewayResponse};
    use crate::ports::world::WorldStorage;
    use async_trait::async_trait;
    use blueprint_domain::{CellState, OperationTarget, PlanRequest};
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ==================== Test Mocks ====================

    struct FakeGateway {
        configured: bool,
        submit_body: String,
        poll_body: String,
        submitted: Mutex<Vec<PlanRequest>>,
        polls: AtomicUsize,
    }

    impl FakeGateway {
        fn returning(body: serde_json::Value) -> Self {
            Self {
                configured: true,
                submit_body: body.to_string(),
                poll_body: r#"{"state":"RUNNING"}"#.to_string(),
                submitted: Mutex::new(Vec::new()),
                polls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlanGateway for FakeGateway {
        async fn submit(&self, request: &PlanRequest) -> Result<GatewayResponse, GatewayError> {
            self.submitted.lock().unwrap().push(request.clone());
            Ok(GatewayResponse::ok(self.submit_body.clone()))
        }

        async fn poll(&self, _run_id: &str) -> Result<GatewayResponse, GatewayError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(GatewayResponse::ok(self.poll_body.clone()))
        }

        async fn fetch(&self, _url: &str) -> Result<GatewayResponse, GatewayError> {
            Ok(GatewayResponse::ok(self.submit_body.clone()))
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    #[derive(Default)]
    struct FakeWorld {
        cells: HashMap<Point3, CellState>,
    }

    impl WorldStorage for FakeWorld {
        fn is_loaded(&self, _pos: Point3) -> bool {
            true
        }

        fn cell(&self, pos: Point3) -> Option<CellState> {
            self.cells.get(&pos).cloned()
        }

        fn set_cell(&mut self, pos: Point3, state: CellState) {
            self.cells.insert(pos, state);
        }

        fn resolve(&self, target: &OperationTarget) -> Option<CellState> {
            Some(CellState::new(target.as_str()))
        }
    }

    struct FakeHost {
        world: FakeWorld,
        online: HashSet<ActorId>,
    }

    impl WorldHost for FakeHost {
        fn is_online(&self, actor: &ActorId) -> bool {
            self.online.contains(actor)
        }

        fn world(&self, _id: &WorldId) -> Option<&dyn WorldStorage> {
            Some(&self.world)
        }

        fn world_mut(&mut self, _id: &WorldId) -> Option<&mut dyn WorldStorage> {
            Some(&mut self.world)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<StatusEvent>>,
        drafting: Mutex<Vec<bool>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.events.lock().unwrap().iter().map(|e| e.to_string()).collect()
        }
    }

    impl StatusNotifier for RecordingNotifier {
        fn notify(&self, _actor: &ActorId, event: &StatusEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn drafting_started(&self, _actor: &ActorId, _request_id: &RequestId) {
            self.drafting.lock().unwrap().push(true);
        }

        fn drafting_stopped(&self, _actor: &ActorId) {
            self.drafting.lock().unwrap().push(false);
        }
    }

    fn plan(ops: usize) -> serde_json::Value {
        let ops: Vec<_> = (0..ops)
            .map(|i| json!({"x": i % 4, "y": i / 16, "z": (i / 4) % 4, "block": "minecraft:cobblestone"}))
            .collect();
        let count = ops.len();
        json!({"meta": {"blockCount": count, "warnings": ["no door"]}, "ops": ops})
    }

    struct Fixture {
        coordinator: BuildCoordinator,
        gateway: Arc<FakeGateway>,
        notifier: Arc<RecordingNotifier>,
        host: FakeHost,
        actor: ActorId,
    }

    fn fixture(gateway: FakeGateway) -> Fixture {
        let actor = ActorId::new("0f8e2c1a-5d4b-4c1e-9a77-3b2d1c0e9f88");
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(RecordingNotifier::default());
        let coordinator = BuildCoordinator::new(
            gateway.clone(),
            notifier.clone(),
            GeneratorSettings::default(),
            ExecutorSettings::default(),
            Handle::current(),
        );
        Fixture {
            coordinator,
            gateway,
            notifier,
            host: FakeHost {
                world: FakeWorld::default(),
                online: HashSet::from([actor.clone()]),
            },
            actor,
        }
    }

    fn select(f: &mut Fixture, kind: SelectionKind, a: (i32, i32, i32), b: (i32, i32, i32)) {
        f.coordinator
            .select_corner(&f.actor, kind, Point3::new(a.0, a.1, a.2));
        f.coordinator
            .select_corner(&f.actor, kind, Point3::new(b.0, b.1, b.2));
    }

    /// Let spawned acquisitions finish, then tick until everything is idle.
    async fn drive(f: &mut Fixture) -> Vec<BuildOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..1000 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            outcomes.extend(f.coordinator.tick(&mut f.host, Instant::now()));
            if f.coordinator.is_idle() {
                break;
            }
        }
        outcomes
    }

    // ==================== Selections ====================

    #[tokio::test]
    async fn test_third_corner_restarts_selection() {
        let mut f = fixture(FakeGateway::returning(plan(1)));
        let actor = f.actor.clone();
        let first = f
            .coordinator
            .select_corner(&actor, SelectionKind::Build, Point3::new(0, 64, 0));
        assert_eq!(first.slot, CornerSlot::First);
        let second = f
            .coordinator
            .select_corner(&actor, SelectionKind::Build, Point3::new(3, 64, 3));
        assert_eq!(second.slot, CornerSlot::Second);
        assert!(second.update.selection.is_complete());

        let third = f
            .coordinator
            .select_corner(&actor, SelectionKind::Build, Point3::new(9, 9, 9));
        assert_eq!(third.slot, CornerSlot::First);
        assert_eq!(third.update.selection.corner_b(), None);
        assert_eq!(
            f.notifier.messages()[2],
            "Build Corner 1 set: 9 9 9"
        );

        let cleared = f.coordinator.clear_selection(&actor, SelectionKind::Build);
        assert_eq!(cleared.selection, RegionSelection::new());
        assert_eq!(
            f.coordinator.selection(&actor, SelectionKind::Build),
            RegionSelection::new()
        );
    }

    // ==================== Admission ====================

    #[tokio::test]
    async fn test_request_without_selection_is_rejected() {
        let mut f = fixture(FakeGateway::returning(plan(1)));
        let err = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "tower")
            .unwrap_err();
        assert_eq!(err, StartBuildError::NoSelection);
        assert!(!f.coordinator.is_busy(&f.actor));
        assert!(f.gateway.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_region_is_rejected() {
        let mut f = fixture(FakeGateway::returning(plan(1)));
        select(&mut f, SelectionKind::Build, (0, 0, 0), (32, 0, 0));
        let err = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "wall")
            .unwrap_err();
        assert!(matches!(err, StartBuildError::RegionTooLarge { max: 32, .. }));
        assert_eq!(
            f.notifier.messages().last().unwrap(),
            "Error: selected region is too large (max 32x32x32)."
        );
    }

    #[tokio::test]
    async fn test_missing_webhook_takes_no_lease() {
        let mut gateway = FakeGateway::returning(plan(1));
        gateway.configured = false;
        let mut f = fixture(gateway);
        select(&mut f, SelectionKind::Build, (0, 0, 0), (3, 0, 3));
        let err = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut")
            .unwrap_err();
        assert_eq!(err, StartBuildError::MissingWebhook);
        assert!(!f.coordinator.is_busy(&f.actor));
    }

    #[tokio::test]
    async fn test_second_request_hits_lock() {
        let mut f = fixture(FakeGateway::returning(plan(4)));
        select(&mut f, SelectionKind::Build, (0, 64, 0), (3, 64, 3));
        f.coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut")
            .unwrap();
        let err = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut again")
            .unwrap_err();
        assert_eq!(err, StartBuildError::LockContention);

        drive(&mut f).await;
        assert_eq!(f.gateway.submitted.lock().unwrap().len(), 1);
        assert!(!f.coordinator.is_busy(&f.actor));
    }

    #[tokio::test]
    async fn test_oversized_context_is_rejected_before_scanning() {
        let mut f = fixture(FakeGateway::returning(plan(1)));
        select(&mut f, SelectionKind::Build, (0, 64, 0), (3, 64, 3));
        select(
            &mut f,
            SelectionKind::Context,
            (-1_000_000, 0, -1_000_000),
            (1_000_000, 255, 1_000_000),
        );
        let err = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut")
            .unwrap_err();
        assert!(matches!(err, StartBuildError::ContextTooLarge { max: 32, .. }));
        assert!(!f.coordinator.is_busy(&f.actor));
        assert!(f.gateway.submitted.lock().unwrap().is_empty());
        assert_eq!(
            f.notifier.messages().last().unwrap(),
            "Error: context region is too large (max 32x32x32)."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lease_does_not_admit_second_workflow() {
        let mut f = fixture(FakeGateway::returning(json!({"run_id": "run-7"})));
        select(&mut f, SelectionKind::Build, (0, 64, 0), (3, 64, 3));
        f.coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "first")
            .unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        // The lease lapses while the first acquisition is still polling.
        let later = Instant::now() + Duration::from_secs(301);
        assert!(f.coordinator.tick(&mut f.host, later).is_empty());
        assert_eq!(f.coordinator.in_flight(), 1);
        assert!(f.coordinator.is_busy(&f.actor));

        let err = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "second")
            .unwrap_err();
        assert_eq!(err, StartBuildError::LockContention);
        assert_eq!(f.gateway.submitted.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(130)).await;
        f.coordinator.tick(&mut f.host, later);
        assert!(f.coordinator.is_idle());
        assert!(!f.coordinator.is_busy(&f.actor));
        assert!(
            f.coordinator
                .request_build(&f.host, &f.actor, &WorldId::default(), "third")
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_import_rejects_non_http_source() {
        let mut f = fixture(FakeGateway::returning(plan(1)));
        select(&mut f, SelectionKind::Build, (0, 0, 0), (3, 3, 3));
        let err = f
            .coordinator
            .import_plan(&f.actor, &WorldId::default(), "file:///etc/passwd")
            .unwrap_err();
        assert_eq!(err, StartBuildError::InvalidSource);
        assert!(!f.coordinator.is_busy(&f.actor));
    }

    // ==================== End to end ====================

    #[tokio::test]
    async fn test_generated_plan_is_built() {
        let mut f = fixture(FakeGateway::returning(plan(45)));
        select(&mut f, SelectionKind::Build, (10, 64, 10), (13, 64, 13));
        f.host
            .world
            .cells
            .insert(Point3::new(0, 0, 0), CellState::new("minecraft:glass"));
        select(&mut f, SelectionKind::Context, (0, 0, 0), (1, 1, 1));

        let request_id = f
            .coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "tiny keep")
            .unwrap();
        assert!(request_id.as_str().starts_with("req-"));
        assert!(request_id.as_str().ends_with("-0f8e2c1a"));
        assert!(f.coordinator.is_busy(&f.actor));

        let outcomes = drive(&mut f).await;
        assert_eq!(
            outcomes,
            vec![BuildOutcome::Completed {
                actor: f.actor.clone(),
                applied: 45
            }]
        );
        assert!(!f.coordinator.is_busy(&f.actor));
        assert_eq!(f.host.world.cells.len(), 46);

        let submitted = f.gateway.submitted.lock().unwrap();
        assert_eq!(submitted[0].size, Size3::new(4, 12, 4));
        assert_eq!(submitted[0].context.as_ref().unwrap().operations.len(), 1);

        let messages = f.notifier.messages();
        let tail: Vec<&str> = messages.iter().skip(4).map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "Drafting: \"tiny keep\"",
                "Selection footprint: 4x4 (height 12)",
                "Context attached (context selection).",
                "Plan validated: 45 ops.",
                "Warnings: no door",
                "Build started (45 ops).",
                "Build complete: 45 blocks.",
            ]
        );
        assert_eq!(*f.notifier.drafting.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_imported_plan_is_built() {
        let mut f = fixture(FakeGateway::returning(plan(3)));
        select(&mut f, SelectionKind::Build, (0, 0, 0), (3, 3, 3));
        let request_id = f
            .coordinator
            .import_plan(&f.actor, &WorldId::default(), "http://plans.test/abc123")
            .unwrap();
        assert!(request_id.as_str().starts_with("paste-"));

        let outcomes = drive(&mut f).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(f.host.world.cells.len(), 3);
        assert!(f.notifier.drafting.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_plan_releases_lease_without_build() {
        let mut body = plan(2);
        body["ops"][1]["x"] = json!(99);
        let mut f = fixture(FakeGateway::returning(body));
        select(&mut f, SelectionKind::Build, (0, 0, 0), (3, 3, 3));
        f.coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut")
            .unwrap();

        let outcomes = drive(&mut f).await;
        assert!(outcomes.is_empty());
        assert!(f.host.world.cells.is_empty());
        assert!(!f.coordinator.is_busy(&f.actor));
        let last = f.notifier.messages().last().cloned().unwrap();
        assert!(last.starts_with("Error: Op 1 out of bounds (99,0,0)"), "{last}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_ceiling_releases_lease_and_creates_no_job() {
        let mut f = fixture(FakeGateway::returning(json!({"run_id": "run-7"})));
        select(&mut f, SelectionKind::Build, (0, 64, 0), (3, 64, 3));
        f.coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut")
            .unwrap();

        tokio::time::sleep(Duration::from_secs(130)).await;
        let outcomes = f.coordinator.tick(&mut f.host, Instant::now());

        assert!(outcomes.is_empty());
        assert_eq!(f.gateway.polls.load(Ordering::SeqCst), 120);
        assert!(f.coordinator.is_idle());
        assert_eq!(f.coordinator.active_builds(), 0);
        assert!(!f.coordinator.is_busy(&f.actor));
        let last = f.notifier.messages().last().cloned().unwrap();
        assert!(last.contains("timed out"), "{last}");
        assert_eq!(*f.notifier.drafting.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_actor_leaving_before_delivery_releases_lease() {
        let mut f = fixture(FakeGateway::returning(plan(2)));
        select(&mut f, SelectionKind::Build, (0, 0, 0), (3, 3, 3));
        f.coordinator
            .request_build(&f.host, &f.actor, &WorldId::default(), "hut")
            .unwrap();
        f.host.online.clear();

        let outcomes = drive(&mut f).await;
        assert!(outcomes.is_empty());
        assert_eq!(f.coordinator.active_builds(), 0);
        assert!(!f.coordinator.is_busy(&f.actor));
    }
}
