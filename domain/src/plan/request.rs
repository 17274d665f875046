//! Outbound generation request.

use super::entities::{BlockOp, Palette};
use crate::core::geometry::{Point3, Size3};
use serde::{Deserialize, Serialize};

/// Body POSTed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub prompt: String,
    pub origin: Point3,
    pub size: Size3,
    pub palette: Palette,
    #[serde(rename = "maxBlocks")]
    pub max_operations: usize,
    /// Serialized as `null` when absent.
    pub context: Option<PlanContext>,
}

/// Snapshot of the surroundings the generator should take into account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanContext {
    pub origin: Point3,
    pub size: Size3,
    /// Non-empty cells of the context region, as offsets from `origin`.
    #[serde(rename = "blocks")]
    pub operations: Vec<BlockOp>,
    /// Reserved for an image of the region; always sent as `null`.
    #[serde(rename = "screenshot")]
    pub snapshot: Option<String>,
}
