//! Axis-aligned region defined by two corners.

use crate::core::geometry::{Point3, Size3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of an actor's selections an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// The region the plan is built into.
    Build,
    /// Optional surroundings sent to the generator as a snapshot.
    Context,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Build => "Build",
            SelectionKind::Context => "Context",
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which corner a corner event filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerSlot {
    First,
    Second,
}

impl fmt::Display for CornerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CornerSlot::First => f.write_str("Corner 1"),
            CornerSlot::Second => f.write_str("Corner 2"),
        }
    }
}

/// Two optional corners. Complete once both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSelection {
    corner_a: Option<Point3>,
    corner_b: Option<Point3>,
}

impl RegionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_corners(corner_a: Option<Point3>, corner_b: Option<Point3>) -> Self {
        Self { corner_a, corner_b }
    }

    pub fn corner_a(&self) -> Option<Point3> {
        self.corner_a
    }

    pub fn corner_b(&self) -> Option<Point3> {
        self.corner_b
    }

    pub fn set_corner_a(&mut self, pos: Point3) {
        self.corner_a = Some(pos);
    }

    pub fn set_corner_b(&mut self, pos: Point3) {
        self.corner_b = Some(pos);
    }

    pub fn clear_corner_b(&mut self) {
        self.corner_b = None;
    }

    pub fn clear(&mut self) {
        self.corner_a = None;
        self.corner_b = None;
    }

    pub fn is_complete(&self) -> bool {
        self.corner_a.is_some() && self.corner_b.is_some()
    }

    /// Apply a corner event with ring-of-two semantics.
    ///
    /// The first event sets corner A, the second sets corner B, and an event
    /// on a complete selection starts over with a new corner A.
    pub fn record_corner(&mut self, pos: Point3) -> CornerSlot {
        match (self.corner_a, self.corner_b) {
            (Some(_), None) => {
                self.corner_b = Some(pos);
                CornerSlot::Second
            }
            _ => {
                self.corner_a = Some(pos);
                self.corner_b = None;
                CornerSlot::First
            }
        }
    }

    pub fn min(&self) -> Option<Point3> {
        Some(self.corner_a?.min(self.corner_b?))
    }

    pub fn max(&self) -> Option<Point3> {
        Some(self.corner_a?.max(self.corner_b?))
    }

    /// `max - min + 1` on each axis, saturating at `i32::MAX`.
    pub fn size(&self) -> Option<Size3> {
        let (min, max) = (self.min()?, self.max()?);
        Some(Size3::new(
            extent(min.x, max.x),
            extent(min.y, max.y),
            extent(min.z, max.z),
        ))
    }
}

fn extent(lo: i32, hi: i32) -> i32 {
    let blocks = i64::from(hi) - i64::from(lo) + 1;
    i32::try_from(blocks).unwrap_or(i32::MAX)
}
