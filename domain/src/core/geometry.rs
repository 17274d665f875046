//! Integer 3D geometry used by selections, plans and builds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// An absolute (or local) block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Translate by a local offset, saturating at the coordinate bounds.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        self.offset(rhs.x, rhs.y, rhs.z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// Extent of a region in blocks: width (x), height (y), length (z).
///
/// Serialized with the short `w`/`h`/`l` keys used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size3 {
    pub w: i32,
    pub h: i32,
    pub l: i32,
}

impl Size3 {
    pub const fn new(w: i32, h: i32, l: i32) -> Self {
        Self { w, h, l }
    }

    /// True when the local offset lies in `[0,w) x [0,h) x [0,l)`.
    pub fn contains_offset(&self, x: i64, y: i64, z: i64) -> bool {
        (0..i64::from(self.w)).contains(&x)
            && (0..i64::from(self.h)).contains(&y)
            && (0..i64::from(self.l)).contains(&z)
    }

    /// Number of cells in the box.
    pub fn volume(&self) -> u64 {
        self.w.max(0) as u64 * self.h.max(0) as u64 * self.l.max(0) as u64
    }

    /// Largest of the three components.
    pub fn max_component(&self) -> i32 {
        self.w.max(self.h).max(self.l)
    }

    /// Same footprint with a different height.
    pub fn with_height(self, h: i32) -> Self {
        Self { h, ..self }
    }
}

impl fmt::Display for Size3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.w, self.h, self.l)
    }
}
