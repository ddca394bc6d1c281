//! Winding number calculation for point-in-polygon testing.
//!
//! Uses a horizontal ray with signed crossings. Points lying exactly on an
//! edge count as inside.

use crate::model::Point;

/// Winding number of `p` relative to the closed ring `polygon`.
///
/// - Positive = counter-clockwise winding
/// - Negative = clockwise winding
/// - Zero = point is outside
pub fn winding_number(p: Point, polygon: &[Point]) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }

    let n = polygon.len();
    let mut winding = 0i32;

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];

        if p1.y <= p.y {
            if p2.y > p.y && edge_side(p1, p2, p) > 0.0 {
                // Upward crossing with p left of the edge
                winding += 1;
            }
        } else if p2.y <= p.y && edge_side(p1, p2, p) < 0.0 {
            // Downward crossing with p right of the edge
            winding -= 1;
        }
    }

    winding
}

/// True when `p` lies exactly on one of the ring's edges.
pub fn point_on_polygon_edge(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    (0..n).any(|i| {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];
        edge_side(p1, p2, p) == 0.0
            && p.x >= p1.x.min(p2.x)
            && p.x <= p1.x.max(p2.x)
            && p.y >= p1.y.min(p2.y)
            && p.y <= p1.y.max(p2.y)
    })
}

/// Boundary-inclusive non-zero containment test.
pub fn is_point_inside_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.is_empty() {
        return false;
    }
    point_on_polygon_edge(p, polygon) || winding_number(p, polygon) != 0
}

/// Cross product of (b - a) and (p - a); positive when p is left of a->b.
#[inline]
fn edge_side(a: Point, b: Point, p: Point) -> f64 {
    (b - a).cross(p - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Vec<Point> {
        vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)]
    }

    #[test]
    fn test_winding_number_square() {
        let sq = square();
        assert_eq!(winding_number(pt(5.0, 5.0), &sq), 1);
        assert_eq!(winding_number(pt(-5.0, 5.0), &sq), 0);
        assert_eq!(winding_number(pt(15.0, 5.0), &sq), 0);
        assert_eq!(winding_number(pt(5.0, -5.0), &sq), 0);
        assert_eq!(winding_number(pt(5.0, 15.0), &sq), 0);
    }

    #[test]
    fn test_winding_number_clockwise() {
        let mut sq = square();
        sq.reverse();
        assert_eq!(winding_number(pt(5.0, 5.0), &sq), -1);
        assert!(is_point_inside_polygon(pt(5.0, 5.0), &sq));
    }

    #[test]
    fn test_concave_polygon() {
        let l_shape = vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 5.0),
            pt(5.0, 5.0),
            pt(5.0, 10.0),
            pt(0.0, 10.0),
        ];
        assert!(is_point_inside_polygon(pt(2.0, 2.0), &l_shape));
        assert!(is_point_inside_polygon(pt(2.0, 7.0), &l_shape));
        assert!(!is_point_inside_polygon(pt(7.0, 7.0), &l_shape));
    }

    #[test]
    fn test_boundary_is_inside() {
        let sq = square();
        assert!(point_on_polygon_edge(pt(5.0, 0.0), &sq));
        assert!(point_on_polygon_edge(pt(10.0, 5.0), &sq));
        assert!(point_on_polygon_edge(pt(0.0, 0.0), &sq));
        assert!(!point_on_polygon_edge(pt(5.0, 5.0), &sq));
        assert!(is_point_inside_polygon(pt(0.0, 5.0), &sq));
        assert!(is_point_inside_polygon(pt(10.0, 10.0), &sq));
        assert!(!is_point_inside_polygon(pt(10.5, 10.0), &sq));
    }

    #[test]
    fn test_empty_and_degenerate() {
        assert_eq!(winding_number(pt(0.0, 0.0), &[]), 0);
        assert!(!is_point_inside_polygon(pt(0.0, 0.0), &[]));
        assert_eq!(winding_number(pt(0.0, 0.0), &[pt(0.0, 0.0), pt(1.0, 1.0)]), 0);
    }
}
