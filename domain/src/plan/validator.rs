//! Structural and semantic validation of untrusted plan documents.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. `meta` is an object and `ops` is an array
//! 2. `ops.len() <= max_operations`
//! 3. every op, in order: integer `x`/`y`/`z`, string `block`, inside the
//!    target size, `block` in the palette
//! 4. `meta.blockCount == ops.len()`

use super::entities::{BlockOp, OperationTarget, Palette, Plan, PlanMeta};
use super::tree::DocumentTree;
use crate::core::geometry::Size3;
use std::fmt;
use thiserror::Error;

/// Why a plan document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Malformed plan: {0}")]
    MalformedPlan(String),

    #[error("Plan has too many ops ({count} > {max})")]
    TooManyOperations { count: usize, max: usize },

    #[error("Op {index} {reason}")]
    InvalidOperation { index: usize, reason: OperationFault },

    #[error("meta.blockCount ({declared}) does not match ops length ({actual})")]
    CountMismatch { declared: i64, actual: usize },
}

/// What was wrong with a single op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationFault {
    NotAnObject,
    MissingField(&'static str),
    OutOfBounds { x: i64, y: i64, z: i64 },
    DisallowedTarget(String),
}

impl fmt::Display for OperationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationFault::NotAnObject => f.write_str("is not an object"),
            OperationFault::MissingField(field) => write!(f, "missing or invalid {}", field),
            OperationFault::OutOfBounds { x, y, z } => {
                write!(f, "out of bounds ({},{},{})", x, y, z)
            }
            OperationFault::DisallowedTarget(id) => write!(f, "uses disallowed block: {}", id),
        }
    }
}

/// Validate a plan document against a target size and vocabulary.
///
/// Pure: the same document and inputs always produce the same result.
pub fn validate_plan<T: DocumentTree>(
    doc: &T,
    target: Size3,
    palette: &Palette,
    max_operations: usize,
) -> Result<Plan, PlanError> {
    let (Some(meta), Some(ops)) = (doc.get("meta"), doc.get("ops")) else {
        return Err(PlanError::MalformedPlan(
            "missing required fields (meta, ops)".to_string(),
        ));
    };
    if !meta.is_object() {
        return Err(PlanError::MalformedPlan("meta must be an object".to_string()));
    }
    let Some(ops) = ops.as_array() else {
        return Err(PlanError::MalformedPlan("ops must be an array".to_string()));
    };

    let Some(declared) = meta.get("blockCount").and_then(|value| value.as_integer()) else {
        return Err(PlanError::MalformedPlan(
            "meta.blockCount must be an integer".to_string(),
        ));
    };
    let warnings = read_warnings(meta)?;
    let theme = meta.get("theme").and_then(|t| t.as_text()).map(str::to_string);

    if ops.len() > max_operations {
        return Err(PlanError::TooManyOperations {
            count: ops.len(),
            max: max_operations,
        });
    }

    let mut parsed = Vec::with_capacity(ops.len());
    for (index, raw) in ops.iter().enumerate() {
        let op = validate_op(raw, target, palette)
            .map_err(|reason| PlanError::InvalidOperation { index, reason })?;
        parsed.push(op);
    }

    if declared != parsed.len() as i64 {
        return Err(PlanError::CountMismatch {
            declared,
            actual: parsed.len(),
        });
    }

    Ok(Plan {
        meta: PlanMeta {
            theme,
            operation_count: parsed.len(),
            warnings,
        },
        ops: parsed,
    })
}

fn validate_op<T: DocumentTree>(
    raw: &T,
    target: Size3,
    palette: &Palette,
) -> Result<BlockOp, OperationFault> {
    if !raw.is_object() {
        return Err(OperationFault::NotAnObject);
    }
    let coord = |field: &'static str| {
        raw.get(field)
            .and_then(|v| v.as_integer())
            .ok_or(OperationFault::MissingField(field))
    };
    let (x, y, z) = (coord("x")?, coord("y")?, coord("z")?);
    let block = raw
        .get("block")
        .and_then(|v| v.as_text())
        .ok_or(OperationFault::MissingField("block"))?;

    if !target.contains_offset(x, y, z) {
        return Err(OperationFault::OutOfBounds { x, y, z });
    }
    if !palette.contains(block) {
        return Err(OperationFault::DisallowedTarget(block.to_string()));
    }

    // In bounds of an i32-sized region, so the narrowing is lossless.
    Ok(BlockOp {
        x: x as i32,
        y: y as i32,
        z: z as i32,
        target: OperationTarget::new(block),
    })
}

fn read_warnings<T: DocumentTree>(meta: &T) -> Result<Vec<String>, PlanError> {
    match meta.get("warnings") {
        None => Ok(Vec::new()),
        Some(value) if value.is_null() => Ok(Vec::new()),
        Some(value) => match value.as_array() {
            Some(items) => Ok(items
                .iter()
                .filter_map(|w| w.as_text().map(str::to_string))
                .collect()),
            None => Err(PlanError::MalformedPlan(
                "meta.warnings must be an array".to_string(),
            )),
        },
    }
}
