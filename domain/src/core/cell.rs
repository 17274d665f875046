//! Concrete cell values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the empty cell.
pub const EMPTY_CELL: &str = "minecraft:air";

/// A concrete value written into (or read from) one world cell, named by its
/// registry identifier (e.g. `minecraft:oak_planks`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellState(String);

impl CellState {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this value clears the cell.
    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_CELL
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
