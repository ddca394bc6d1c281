// Parametric segment-segment intersection.
// Near-parallel pairs (|denominator| below EPS_DENOM) are treated as disjoint.

use super::math::lerp_point;
use super::tolerance::{EPS_DENOM, EPS_PARAM};
use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// Parameter along the first segment.
    pub t: f64,
    /// Parameter along the second segment.
    pub u: f64,
}

impl Intersection {
    /// True when the crossing is strictly inside both segments, i.e. not an
    /// endpoint touch.
    #[inline]
    pub fn is_interior(&self) -> bool {
        let inside = |v: f64| v > EPS_PARAM && v < 1.0 - EPS_PARAM;
        inside(self.t) && inside(self.u)
    }
}

/// Intersection of `a1-a2` with `b1-b2`, inclusive of endpoints.
pub fn intersect_segments(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Intersection> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() < EPS_DENOM {
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Intersection { point: lerp_point(a1, a2, t), t, u })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point { Point::new(x, y) }

    #[test]
    fn proper_crossing() {
        let hit = intersect_segments(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)).unwrap();
        assert!((hit.point.x - 5.0).abs() < 1e-9 && (hit.point.y - 5.0).abs() < 1e-9);
        assert!((hit.t - 0.5).abs() < 1e-12 && (hit.u - 0.5).abs() < 1e-12);
        assert!(hit.is_interior());
    }

    #[test]
    fn endpoint_touch_is_not_interior() {
        let hit = intersect_segments(p(0.0, 0.0), p(10.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)).unwrap();
        assert_eq!(hit.t, 1.0);
        assert!(!hit.is_interior());
    }

    #[test]
    fn parallel_and_disjoint() {
        assert!(intersect_segments(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 1.0), p(10.0, 1.0)).is_none());
        assert!(intersect_segments(p(0.0, 0.0), p(1.0, 1.0), p(5.0, 0.0), p(6.0, -1.0)).is_none());
    }
}
