use super::intersect::intersect_segments;
use crate::algorithms::winding::is_point_inside_polygon;
use crate::model::{Bounds, Point, Segment};
use serde::{Deserialize, Serialize};

/// Ordered ring of points plus its boundary segments.
///
/// Rings built with [`Polygon::new`] have one segment per consecutive point
/// pair, closing back to the first point. Union splitting subdivides
/// `segments` in place and polygons loaded from a document keep whatever
/// segments they were saved with, so code must not assume `segments` follows
/// `points`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        let n = points.len();
        let segments = (0..n)
            .map(|i| Segment::new(points[i], points[(i + 1) % n]))
            .collect();
        Self { points, segments }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().copied())
    }

    /// Cheap pre-test: the two bounding boxes overlap.
    pub fn intersection_possible(&self, other: &Polygon) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Boundary-inclusive containment over the ring.
    #[inline]
    pub fn contains_point(&self, p: Point) -> bool {
        is_point_inside_polygon(p, &self.points)
    }

    pub fn contains_segment(&self, s: &Segment) -> bool {
        self.contains_point(s.midpoint())
    }

    /// Any pair of boundary segments meets (endpoint touches included).
    pub fn intersects(&self, other: &Polygon) -> bool {
        self.segments.iter().any(|s1| {
            other
                .segments
                .iter()
                .any(|s2| intersect_segments(s1.p1, s1.p2, s2.p1, s2.p2).is_some())
        })
    }

    /// Distance from `p` to the nearest boundary segment; infinite when empty.
    pub fn min_dist_from_point(&self, p: Point) -> f64 {
        self.segments
            .iter()
            .map(|s| s.min_dist_to_point(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Symmetric vertex-to-boundary minimum in both directions.
    pub fn min_dist_from_polygon(&self, other: &Polygon) -> f64 {
        let ab = self
            .points
            .iter()
            .map(|&p| other.min_dist_from_point(p))
            .fold(f64::INFINITY, f64::min);
        let ba = other
            .points
            .iter()
            .map(|&p| self.min_dist_from_point(p))
            .fold(f64::INFINITY, f64::min);
        ab.min(ba)
    }

    /// Vertex average.
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let sum = self.points.iter().fold(Point::ZERO, |acc, &p| acc + p);
        Some(sum * (1.0 / n))
    }

    /// Unsigned shoelace area of the ring.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| self.points[i].cross(self.points[(i + 1) % n]))
            .sum();
        twice.abs() * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, side: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        ])
    }

    #[test]
    fn ring_segments_close() {
        let sq = square(0.0, 0.0, 10.0);
        assert_eq!(sq.segments.len(), 4);
        assert_eq!(sq.segments[3].p2, sq.points[0]);
        assert_eq!(sq.area(), 100.0);
    }

    #[test]
    fn overlap_and_distance() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let c = square(13.0, 0.0, 2.0);
        assert!(a.intersection_possible(&b) && a.intersects(&b));
        assert!(!a.intersection_possible(&c));
        assert_eq!(a.min_dist_from_polygon(&c), 3.0);
        assert_eq!(c.min_dist_from_polygon(&a), 3.0);
    }

    #[test]
    fn centroid_is_contained() {
        let sq = square(-3.0, 2.0, 4.0);
        let c = sq.centroid().unwrap();
        assert_eq!(c, Point::new(-1.0, 4.0));
        assert!(sq.contains_point(c));
        assert!(!sq.contains_point(Point::new(100.0, 100.0)));
    }
}
