use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric seat identifier, as printed on the map labels (e.g. "147").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub u32);

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<u32> for SeatId {
    fn from(value: u32) -> Self { Self(value) }
}

/// Monotonic counter identifying one document load (or one feed poll).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation that follows this one.
    #[inline] pub fn next(self) -> Self { Self(self.0 + 1) }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "gen-{}", self.0) }
}

/// Runtime identifier assigned to a shape when its document is extracted.
///
/// The index is sequential in document order; the generation ties the id to
/// the document load that produced it, so ids from a replaced document never
/// alias shapes of the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId {
    pub generation: Generation,
    pub index: u32,
}

impl ShapeId {
    pub fn new(generation: Generation, index: u32) -> Self { Self { generation, index } }
}

impl fmt::Display for ShapeId {
    /// Format as the DOM-style id: shape-{index}
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "shape-{}", self.index) }
}
