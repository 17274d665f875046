//! Selection-update record.
//!
//! Layout (little-endian):
//!
//! ```text
//! u8   is_build       1 = build selection, 0 = context selection
//! u8   has_corner_a   followed by 3 x i32 (x, y, z) when 1
//! u8   has_corner_b   followed by 3 x i32 (x, y, z) when 1
//! ```

use super::region::{RegionSelection, SelectionKind};
use crate::core::geometry::Point3;
use thiserror::Error;

/// Encoded size of one present corner.
const CORNER_BYTES: usize = 12;

/// Errors from decoding a selection-update record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionCodecError {
    #[error("truncated selection record: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid flag byte {value:#04x} at offset {offset}")]
    InvalidFlag { value: u8, offset: usize },

    #[error("{0} trailing bytes after selection record")]
    TrailingBytes(usize),
}

/// A selection snapshot pushed to a client after every corner or clear event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub kind: SelectionKind,
    pub selection: RegionSelection,
}

impl SelectionUpdate {
    pub fn new(kind: SelectionKind, selection: RegionSelection) -> Self {
        Self { kind, selection }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3 + 2 * CORNER_BYTES);
        buf.push(u8::from(self.kind == SelectionKind::Build));
        write_corner(&mut buf, self.selection.corner_a());
        write_corner(&mut buf, self.selection.corner_b());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SelectionCodecError> {
        let mut reader = Reader { bytes, offset: 0 };
        let kind = if reader.flag()? {
            SelectionKind::Build
        } else {
            SelectionKind::Context
        };
        let corner_a = reader.corner()?;
        let corner_b = reader.corner()?;
        if reader.offset != bytes.len() {
            return Err(SelectionCodecError::TrailingBytes(bytes.len() - reader.offset));
        }
        Ok(Self {
            kind,
            selection: RegionSelection::from_corners(corner_a, corner_b),
        })
    }
}

fn write_corner(buf: &mut Vec<u8>, corner: Option<Point3>) {
    match corner {
        Some(p) => {
            buf.push(1);
            buf.extend_from_slice(&p.x.to_le_bytes());
            buf.extend_from_slice(&p.y.to_le_bytes());
            buf.extend_from_slice(&p.z.to_le_bytes());
        }
        None => buf.push(0),
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], SelectionCodecError> {
        let end = self.offset + n;
        if end > self.bytes.len() {
            return Err(SelectionCodecError::Truncated {
                expected: end,
                actual: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn flag(&mut self) -> Result<bool, SelectionCodecError> {
        let offset = self.offset;
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SelectionCodecError::InvalidFlag { value, offset }),
        }
    }

    fn i32(&mut self) -> Result<i32, SelectionCodecError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn corner(&mut self) -> Result<Option<Point3>, SelectionCodecError> {
        if !self.flag()? {
            return Ok(None);
        }
        Ok(Some(Point3::new(self.i32()?, self.i32()?, self.i32()?)))
    }
}
