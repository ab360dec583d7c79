use std::collections::BTreeMap;

use rstar::RTree;
use tracing::debug;

use crate::geom::IndexedPoint;
use crate::types::{Generation, SeatId, ShapeId};
use super::MapDocument;

/// Derived shape → seat association for one document generation.
///
/// Every shape of the document has an entry; unbound shapes map to `None`.
/// Several shapes may share a seat (islands, enclaves).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    generation: Generation,
    seats: BTreeMap<ShapeId, Option<SeatId>>,
}

impl Bindings {
    /// See [`build_bindings`].
    #[inline]
    pub fn build(document: &MapDocument, threshold: f64) -> Self { build_bindings(document, threshold) }

    #[inline] pub fn generation(&self) -> Generation { self.generation }

    /// Seat bound to `shape`, if any.
    #[inline]
    pub fn seat_of(&self, shape: ShapeId) -> Option<SeatId> {
        self.seats.get(&shape).copied().flatten()
    }

    /// All shapes bound to `seat`, in document order.
    pub fn shapes_for(&self, seat: SeatId) -> impl Iterator<Item = ShapeId> + '_ {
        self.seats.iter().filter(move |(_, s)| **s == Some(seat)).map(|(id, _)| *id)
    }

    /// Iterate `(shape, seat)` over every shape in document order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, Option<SeatId>)> + '_ {
        self.seats.iter().map(|(id, seat)| (*id, *seat))
    }

    /// Number of shapes with a seat.
    pub fn bound_count(&self) -> usize { self.seats.values().filter(|s| s.is_some()).count() }

    /// True if no shape is bound to any seat.
    pub fn is_unbound(&self) -> bool { self.bound_count() == 0 }

    #[inline] pub fn len(&self) -> usize { self.seats.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.seats.is_empty() }
}

/// Bind every shape of `document` to the nearest seat label whose distance
/// from the shape's bounding-box center is at most `threshold`.
///
/// Exact distance ties go to the label that comes first in the document.
/// Shapes without bounds, and every shape of a document without labels,
/// stay unbound.
pub fn build_bindings(document: &MapDocument, threshold: f64) -> Bindings {
    let labels = document.labels();
    let tree = RTree::bulk_load(
        labels.iter().enumerate()
            .map(|(i, label)| IndexedPoint::new(i, label.at))
            .collect()
    );

    let seats: BTreeMap<ShapeId, Option<SeatId>> = document.shapes().iter()
        .map(|shape| {
            let seat = shape.center().and_then(|c| {
                let query = [c.x, c.y];
                let mut nearest = tree.nearest_neighbor_iter_with_distance_2(&query);
                let (first, d2) = nearest.next()?;
                let idx = nearest
                    .take_while(|(_, other)| *other == d2)
                    .map(|(p, _)| p.idx())
                    .fold(first.idx(), usize::min);
                (d2.sqrt() <= threshold).then(|| labels[idx].seat)
            });
            (shape.id, seat)
        })
        .collect();

    let bindings = Bindings { generation: document.generation(), seats };
    debug!(
        "[map::binding] {}: bound {}/{} shapes (threshold {threshold})",
        bindings.generation,
        bindings.bound_count(),
        bindings.len()
    );
    bindings
}
