use geo::{Coord, Rect};
use rstar::{PointDistance, RTreeObject, AABB};

/// Running axis-aligned bounds over a stream of points.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Bounds {
    min: Option<Coord<f64>>,
    max: Option<Coord<f64>>,
}

impl Bounds {
    /// Extend the bounds to include `c`. Non-finite points are ignored.
    pub(crate) fn add(&mut self, c: Coord<f64>) {
        if !c.x.is_finite() || !c.y.is_finite() { return }
        match (self.min.as_mut(), self.max.as_mut()) {
            (Some(min), Some(max)) => {
                min.x = min.x.min(c.x);
                min.y = min.y.min(c.y);
                max.x = max.x.max(c.x);
                max.y = max.y.max(c.y);
            }
            _ => {
                self.min = Some(c);
                self.max = Some(c);
            }
        }
    }

    /// The accumulated rectangle, or `None` if no point was added.
    pub(crate) fn to_rect(self) -> Option<Rect<f64>> {
        Some(Rect::new(self.min?, self.max?))
    }
}

/// A label position in an R-tree, associated with a label by index.
#[derive(Debug, Clone)]
pub(crate) struct IndexedPoint {
    idx: usize, // Index of corresponding label in document order
    at: [f64; 2],
}

impl IndexedPoint {
    pub(crate) fn new(idx: usize, at: Coord<f64>) -> Self {
        Self { idx, at: [at.x, at.y] }
    }

    /// Get the index of the corresponding label.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { AABB::from_point(self.at) }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.at[0] - point[0];
        let dy = self.at[1] - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool { self.at == *point }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_have_no_rect() {
        assert!(Bounds::default().to_rect().is_none());
    }

    #[test]
    fn bounds_grow_to_cover_points() {
        let mut b = Bounds::default();
        b.add(Coord { x: 4.0, y: -1.0 });
        b.add(Coord { x: -2.0, y: 3.0 });
        b.add(Coord { x: f64::NAN, y: 100.0 });
        let rect = b.to_rect().unwrap();
        assert_eq!(rect.min(), Coord { x: -2.0, y: -1.0 });
        assert_eq!(rect.max(), Coord { x: 4.0, y: 3.0 });
        assert_eq!(rect.center(), Coord { x: 1.0, y: 1.0 });
    }
}
