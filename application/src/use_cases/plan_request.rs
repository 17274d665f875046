//! Generation request construction.
//!
//! Turns the actor's selections into a [`PlanRequest`]: effective build size,
//! palette, operation cap and an optional snapshot of the context region.

use crate::config::GeneratorSettings;
use crate::ports::world::WorldStorage;
use blueprint_domain::{
    BlockOp, Palette, PlanContext, PlanRequest, Point3, RegionSelection, Size3,
};

/// Size the plan is requested and validated against.
///
/// A selection one block tall is a footprint drawn on the ground; its height is
/// replaced by `default_height`.
pub fn effective_build_size(selection: &RegionSelection, default_height: i32) -> Option<Size3> {
    let size = selection.size()?;
    if size.h <= 1 {
        Some(size.with_height(default_height))
    } else {
        Some(size)
    }
}

/// Snapshot of the context region.
///
/// Cells are visited x, then y, then z. Empty cells and cells whose value is not
/// in the palette are skipped; offsets are relative to the region minimum.
/// Returns `None` for an incomplete selection or when nothing was captured.
pub fn capture_context(
    world: &dyn WorldStorage,
    selection: &RegionSelection,
    palette: &Palette,
    max_blocks: usize,
) -> Option<PlanContext> {
    let (min, max, size) = (selection.min()?, selection.max()?, selection.size()?);

    let mut operations = Vec::new();
    'scan: for x in min.x..=max.x {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                if operations.len() >= max_blocks {
                    break 'scan;
                }
                let Some(cell) = world.cell(Point3::new(x, y, z)) else {
                    continue;
                };
                if cell.is_empty() || !palette.contains(cell.as_str()) {
                    continue;
                }
                operations.push(BlockOp::new(x - min.x, y - min.y, z - min.z, cell.as_str()));
            }
        }
    }

    if operations.is_empty() {
        return None;
    }
    Some(PlanContext {
        origin: min,
        size,
        operations,
        snapshot: None,
    })
}

/// Assemble the request body for a build selection.
///
/// `None` when the build selection is incomplete.
pub fn build_plan_request(
    prompt: &str,
    build: &RegionSelection,
    context: Option<PlanContext>,
    settings: &GeneratorSettings,
) -> Option<PlanRequest> {
    let origin = build.min()?;
    let size = effective_build_size(build, settings.default_build_height)?;
    Some(PlanRequest {
        prompt: prompt.to_string(),
        origin,
        size,
        palette: settings.palette.clone(),
        max_operations: settings.max_operations,
        context,
    })
}
