//! CLI entrypoint for blueprint
//!
//! This is the main binary that wires together all layers using
//! dependency injection, then drives the build coordinator at a fixed tick
//! rate against an in-memory world.

use anyhow::{Context, Result, anyhow, bail};
use blueprint_application::{BuildAbort, BuildCoordinator, BuildOutcome, PlanGateway};
use blueprint_domain::{ActorId, Point3, RequestId, SelectionKind, WorldId};
use blueprint_infrastructure::{
    ConfigLoader, DemoPlanGateway, DemoScenario, FileConfig, HttpPlanGateway, MemoryHost,
    MemoryWorld,
};
use blueprint_presentation::{
    BuildSummary, Cli, Command, ConsoleNotifier, Coordinate, DemoKind, PlacedCell, RegionArgs,
    SummaryOutcome, formatter_for,
};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// 20 ticks per second.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting blueprint");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {e}"))?
    };
    let problems = config.validate();
    if !problems.is_empty() {
        let list: Vec<String> = problems.iter().map(|p| format!("  - {p}")).collect();
        bail!("invalid configuration:\n{}", list.join("\n"));
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let notifier = Arc::new(if cli.quiet {
        ConsoleNotifier::quiet()
    } else {
        ConsoleNotifier::new()
    });

    // === Dependency Injection ===
    let (gateway, job): (Arc<dyn PlanGateway>, Job) = match cli.command {
        Command::Config => {
            print_config(&config)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Build {
            prompt,
            region,
            context_from,
            context_to,
        } => {
            let gateway = HttpPlanGateway::from_config(&config.generator)
                .context("invalid generator endpoint")?;
            let context = context_from.zip(context_to).map(|(a, b)| (point(a), point(b)));
            (
                Arc::new(gateway),
                Job::Generate {
                    prompt,
                    corners: corners(&region),
                    context,
                },
            )
        }
        Command::Import { url, region } => {
            let gateway = HttpPlanGateway::from_config(&config.generator)
                .context("invalid generator endpoint")?;
            (
                Arc::new(gateway),
                Job::Import {
                    url,
                    corners: corners(&region),
                },
            )
        }
        Command::Demo { kind } => {
            let scenario = match kind {
                DemoKind::Cabin => DemoScenario::Cabin,
                DemoKind::Gate => DemoScenario::Gate,
            };
            (
                Arc::new(DemoPlanGateway::new(scenario)),
                Job::Generate {
                    prompt: scenario.prompt().to_string(),
                    corners: scenario.corners(),
                    context: None,
                },
            )
        }
    };

    let coordinator = BuildCoordinator::new(
        gateway,
        notifier.clone(),
        config.generator_settings(),
        config.executor_settings(),
        Handle::current(),
    );
    let session = Session::new(coordinator, &job);
    let summary = session.run(job, &notifier, &cancel).await;

    println!("{}", formatter_for(cli.output).format(&summary));
    Ok(if summary.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// What the session should ask the coordinator for.
enum Job {
    Generate {
        prompt: String,
        corners: (Point3, Point3),
        context: Option<(Point3, Point3)>,
    },
    Import {
        url: String,
        corners: (Point3, Point3),
    },
}

impl Job {
    fn corners(&self) -> (Point3, Point3) {
        match self {
            Job::Generate { corners, .. } | Job::Import { corners, .. } => *corners,
        }
    }
}

/// One actor in one in-memory world, driven until the coordinator is idle.
struct Session {
    coordinator: BuildCoordinator,
    host: MemoryHost,
    actor: ActorId,
    world: WorldId,
}

impl Session {
    fn new(coordinator: BuildCoordinator, job: &Job) -> Self {
        let actor = ActorId::new("console");
        let world = WorldId::default();

        let mut storage = MemoryWorld::new();
        let (a, b) = job.corners();
        storage.load_area(a, b);
        if let Job::Generate {
            context: Some((ca, cb)),
            ..
        } = job
        {
            storage.load_area(*ca, *cb);
        }

        let mut host = MemoryHost::new();
        host.insert_world(world.clone(), storage);
        host.connect(actor.clone());

        Self {
            coordinator,
            host,
            actor,
            world,
        }
    }

    async fn run(
        mut self,
        job: Job,
        notifier: &ConsoleNotifier,
        cancel: &CancellationToken,
    ) -> BuildSummary {
        let started = Instant::now();
        let (a, b) = job.corners();
        self.select(SelectionKind::Build, a, b);

        let submitted = match job {
            Job::Generate {
                prompt, context, ..
            } => {
                if let Some((ca, cb)) = context {
                    self.select(SelectionKind::Context, ca, cb);
                }
                self.coordinator
                    .request_build(&self.host, &self.actor, &self.world, &prompt)
            }
            Job::Import { url, .. } => self.coordinator.import_plan(&self.actor, &self.world, &url),
        };

        let request_id = match submitted {
            Ok(request_id) => request_id,
            Err(e) => {
                return self.summary(
                    None,
                    SummaryOutcome::Rejected,
                    Some(e.to_string()),
                    0,
                    0,
                    started,
                );
            }
        };
        info!("{} -> submitted", request_id);

        let (outcome, interrupted) = self.drive(cancel).await;
        let total = notifier.planned_operations().unwrap_or(0);
        let (kind, message, applied) = match outcome {
            _ if interrupted => (
                SummaryOutcome::Interrupted,
                Some("interrupted".to_string()),
                0,
            ),
            Some(BuildOutcome::Completed { applied, .. }) => {
                (SummaryOutcome::Completed, None, applied)
            }
            Some(BuildOutcome::Aborted { abort, .. }) => {
                let applied = match &abort {
                    BuildAbort::StorageUnavailable { applied, .. } => *applied,
                    BuildAbort::UnknownTarget { index, .. } => *index,
                };
                (SummaryOutcome::Aborted, Some(abort.to_string()), applied)
            }
            Some(BuildOutcome::Discarded { applied, .. }) => (
                SummaryOutcome::Interrupted,
                Some("actor disconnected".to_string()),
                applied,
            ),
            None => (SummaryOutcome::Failed, notifier.last_error(), 0),
        };

        self.summary(Some(request_id), kind, message, applied, total, started)
    }

    fn select(&mut self, kind: SelectionKind, a: Point3, b: Point3) {
        self.coordinator.select_corner(&self.actor, kind, a);
        self.coordinator.select_corner(&self.actor, kind, b);
    }

    /// Tick until nothing is in flight. Returns this actor's terminal
    /// outcome, if any, and whether the run was cancelled.
    async fn drive(&mut self, cancel: &CancellationToken) -> (Option<BuildOutcome>, bool) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = None;
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!("Interrupted after {} ticks", ticks);
                    return (last, true);
                }
                _ = ticker.tick() => {}
            }
            ticks += 1;

            for outcome in self.coordinator.tick(&mut self.host, Instant::now()) {
                if outcome.actor() == &self.actor {
                    last = Some(outcome);
                }
            }
            if self.coordinator.is_idle() {
                debug!("Coordinator idle after {} ticks", ticks);
                return (last, false);
            }
        }
    }

    fn summary(
        &self,
        request_id: Option<RequestId>,
        outcome: SummaryOutcome,
        message: Option<String>,
        applied: usize,
        total: usize,
        started: Instant,
    ) -> BuildSummary {
        let cells = self
            .host
            .memory_world(&self.world)
            .map(|world| {
                world
                    .cells()
                    .into_iter()
                    .map(|(pos, state)| PlacedCell {
                        x: pos.x,
                        y: pos.y,
                        z: pos.z,
                        block: state.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        BuildSummary {
            request_id: request_id.map(|id| id.to_string()),
            outcome,
            message,
            applied,
            total,
            elapsed_ms: started.elapsed().as_millis(),
            cells,
        }
    }
}

fn point(c: Coordinate) -> Point3 {
    Point3::new(c.x, c.y, c.z)
}

fn corners(region: &RegionArgs) -> (Point3, Point3) {
    (point(region.from), point(region.to))
}

fn print_config(config: &FileConfig) -> Result<()> {
    for line in ConfigLoader::describe_sources() {
        println!("{}", line);
    }
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).context("failed to serialize configuration")?
    );
    Ok(())
}

/// Install the subscriber. The returned guard flushes the log file on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("log file path has no file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
