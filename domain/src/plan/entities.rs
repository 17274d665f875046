//! Plan entities and the allowed operation vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier naming what to place at an offset. Opaque to the domain; only
/// membership in a [`Palette`] is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationTarget(String);

impl OperationTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One placement at a local offset within the target region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOp {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(rename = "block")]
    pub target: OperationTarget,
}

impl BlockOp {
    pub fn new(x: i32, y: i32, z: i32, target: impl Into<String>) -> Self {
        Self {
            x,
            y,
            z,
            target: OperationTarget::new(target),
        }
    }
}

/// Plan metadata as produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(rename = "blockCount")]
    pub operation_count: usize,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// A validated plan. Only [`validate_plan`](super::validator::validate_plan)
/// produces these from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub meta: PlanMeta,
    pub ops: Vec<BlockOp>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Identifiers a plan may reference. Order is preserved for the outbound
/// request; lookups are linear since palettes stay small.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<OperationTarget>);

impl Palette {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut targets: Vec<OperationTarget> = Vec::new();
        for id in ids {
            let target = OperationTarget::new(id);
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Self(targets)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|t| t.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationTarget> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().copied())
    }
}

/// Building vocabulary offered to the generator by default.
pub const DEFAULT_PALETTE: &[&str] = &[
    "minecraft:oak_log",
    "minecraft:oak_planks",
    "minecraft:cobblestone",
    "minecraft:stone_bricks",
    "minecraft:oak_stairs",
    "minecraft:cobblestone_stairs",
    "minecraft:stone_brick_stairs",
    "minecraft:oak_slab",
    "minecraft:cobblestone_slab",
    "minecraft:stone_brick_slab",
    "minecraft:oak_fence",
    "minecraft:cobblestone_wall",
    "minecraft:oak_door",
    "minecraft:oak_trapdoor",
    "minecraft:torch",
    "minecraft:lantern",
    "minecraft:glass",
];
