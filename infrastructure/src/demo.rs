//! Offline plan generator for the CLI demo.
//!
//! [`DemoPlanGateway`] behaves like an asynchronous generator: a submission is
//! answered with a run reference, the first polls report the run as still
//! running, and a later poll carries the plan as a string-encoded output.

use async_trait::async_trait;
use blueprint_application::{GatewayError, GatewayResponse, PlanGateway};
use blueprint_domain::{BlockOp, PlanRequest, Point3, Size3};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Canned structures the demo generator knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoScenario {
    Cabin,
    Gate,
}

impl DemoScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoScenario::Cabin => "cabin",
            DemoScenario::Gate => "gate",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            DemoScenario::Cabin => "a small oak cabin with a cobblestone floor and a slab roof",
            DemoScenario::Gate => "a stone brick gate with lanterns",
        }
    }

    /// Build selection corners used by the demo command.
    pub fn corners(&self) -> (Point3, Point3) {
        match self {
            DemoScenario::Cabin => (Point3::new(0, 64, 0), Point3::new(6, 68, 5)),
            DemoScenario::Gate => (Point3::new(10, 64, 0), Point3::new(16, 69, 1)),
        }
    }

    /// Placements filling a region of `size`, truncated to `max_operations`.
    pub fn operations(&self, size: Size3, max_operations: usize) -> Vec<BlockOp> {
        let mut ops = match self {
            DemoScenario::Cabin => cabin(size),
            DemoScenario::Gate => gate(size),
        };
        ops.truncate(max_operations);
        ops
    }

    /// Plan document in the generator's wire shape.
    pub fn plan_document(&self, size: Size3, max_operations: usize) -> Value {
        let ops = self.operations(size, max_operations);
        json!({
            "meta": {
                "theme": self.as_str(),
                "blockCount": ops.len(),
                "warnings": [],
            },
            "ops": ops,
        })
    }
}

fn cabin(size: Size3) -> Vec<BlockOp> {
    let (w, h, l) = (size.w, size.h, size.l);
    let mut ops = Vec::new();

    for x in 0..w {
        for z in 0..l {
            ops.push(BlockOp::new(x, 0, z, "minecraft:cobblestone"));
        }
    }

    let is_corner = |x: i32, z: i32| (x == 0 || x == w - 1) && (z == 0 || z == l - 1);
    let door = (w / 2, 0);
    for y in 1..h - 1 {
        for x in 0..w {
            for z in 0..l {
                let on_wall = x == 0 || x == w - 1 || z == 0 || z == l - 1;
                if !on_wall {
                    continue;
                }
                if (x, z) == door && y <= 2 {
                    if y == 1 {
                        ops.push(BlockOp::new(x, y, z, "minecraft:oak_door"));
                    }
                    continue;
                }
                let block = if is_corner(x, z) {
                    "minecraft:oak_log"
                } else {
                    "minecraft:oak_planks"
                };
                ops.push(BlockOp::new(x, y, z, block));
            }
        }
    }

    if h > 1 {
        for x in 0..w {
            for z in 0..l {
                ops.push(BlockOp::new(x, h - 1, z, "minecraft:oak_slab"));
            }
        }
    }
    if w > 2 && l > 2 && h > 3 {
        ops.push(BlockOp::new(1, 2, l - 2, "minecraft:torch"));
    }
    ops
}

fn gate(size: Size3) -> Vec<BlockOp> {
    let (w, h, l) = (size.w, size.h, size.l);
    let mut ops = Vec::new();

    for z in 0..l {
        for y in 0..h {
            ops.push(BlockOp::new(0, y, z, "minecraft:stone_bricks"));
            if w > 1 {
                ops.push(BlockOp::new(w - 1, y, z, "minecraft:stone_bricks"));
            }
        }
        for x in 1..w - 1 {
            ops.push(BlockOp::new(x, h - 1, z, "minecraft:stone_brick_slab"));
        }
    }
    if w > 2 && h > 2 {
        ops.push(BlockOp::new(1, h - 2, 0, "minecraft:lantern"));
        ops.push(BlockOp::new(w - 2, h - 2, 0, "minecraft:lantern"));
    }
    ops
}

/// Polls answered with `RUNNING` before the plan is released.
pub const DEMO_PENDING_POLLS: u32 = 2;

struct DemoRun {
    size: Size3,
    max_operations: usize,
    polls: u32,
}

#[derive(Default)]
struct DemoState {
    next_run: u64,
    runs: HashMap<String, DemoRun>,
}

/// In-process [`PlanGateway`] producing [`DemoScenario`] plans.
pub struct DemoPlanGateway {
    scenario: DemoScenario,
    state: Mutex<DemoState>,
}

impl DemoPlanGateway {
    pub fn new(scenario: DemoScenario) -> Self {
        Self {
            scenario,
            state: Mutex::new(DemoState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, DemoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PlanGateway for DemoPlanGateway {
    async fn submit(&self, request: &PlanRequest) -> Result<GatewayResponse, GatewayError> {
        let mut state = self.state();
        state.next_run += 1;
        let run_id = format!("demo-run-{}", state.next_run);
        state.runs.insert(
            run_id.clone(),
            DemoRun {
                size: request.size,
                max_operations: request.max_operations,
                polls: 0,
            },
        );
        let body = json!({"run_id": run_id, "url": format!("demo://runs/{run_id}")});
        Ok(GatewayResponse::ok(body.to_string()))
    }

    async fn poll(&self, run_id: &str) -> Result<GatewayResponse, GatewayError> {
        let mut state = self.state();
        let Some(run) = state.runs.get_mut(run_id) else {
            return Ok(GatewayResponse::new(404, r#"{"error":"unknown run"}"#));
        };
        run.polls += 1;
        if run.polls <= DEMO_PENDING_POLLS {
            return Ok(GatewayResponse::ok(
                json!({"state": "RUNNING", "outputs": null}).to_string(),
            ));
        }

        let plan = json!({"response": self.scenario.plan_document(run.size, run.max_operations)});
        let body = json!({
            "state": "COMPLETED",
            "outputs": {"plan_step": plan.to_string()},
        });
        Ok(GatewayResponse::ok(body.to_string()))
    }

    async fn fetch(&self, url: &str) -> Result<GatewayResponse, GatewayError> {
        Err(GatewayError::Connection(format!(
            "demo generator cannot fetch {url}"
        )))
    }
}
