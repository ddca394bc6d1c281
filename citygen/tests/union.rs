//! Integration tests for the polygon union boundary.

use citygen::algorithms::union::polygon_union;
use citygen::tasks::Progress;
use citygen::{NoProgress, Point, Polygon, Segment, Status, TaskPool};

/// Axis-aligned rectangle, counter-clockwise from (x0, y0).
fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ])
}

fn total_length(segs: &[Segment]) -> f64 {
    segs.iter().map(Segment::length).sum()
}

#[test]
fn test_disjoint_union_is_concatenation() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(20.0, 0.0, 30.0, 10.0);
    let expected: Vec<Segment> = a.segments.iter().chain(&b.segments).copied().collect();

    let out = polygon_union(vec![a, b], &TaskPool::new(2), &mut NoProgress).unwrap();
    assert_eq!(out, expected, "disjoint polygons must pass through unchanged");
}

#[test]
fn test_contained_polygon_disappears() {
    let outer = rect(0.0, 0.0, 10.0, 10.0);
    let inner = rect(2.0, 2.0, 4.0, 4.0);
    let expected = outer.segments.clone();

    let out = polygon_union(vec![outer, inner], &TaskPool::new(2), &mut NoProgress).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn test_contained_polygon_listed_first() {
    let inner = rect(2.0, 2.0, 4.0, 4.0);
    let outer = rect(0.0, 0.0, 10.0, 10.0);
    let expected = outer.segments.clone();

    let out = polygon_union(vec![inner, outer], &TaskPool::new(1), &mut NoProgress).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn test_shared_edge_is_dropped() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(10.0, 0.0, 20.0, 10.0);
    let out = polygon_union(vec![a, b], &TaskPool::new(2), &mut NoProgress).unwrap();

    assert_eq!(out.len(), 6);
    assert!((total_length(&out) - 60.0).abs() < 1e-9);
    assert!(out.iter().all(|s| (s.midpoint().x - 10.0).abs() > 1e-9));
}

#[test]
fn test_cross_shape_outline() {
    // Plus sign: the outline has 12 edges of length 10.
    let h = rect(0.0, 10.0, 30.0, 20.0);
    let v = rect(10.0, 0.0, 20.0, 30.0);
    let out = polygon_union(vec![h, v], &TaskPool::new(2), &mut NoProgress).unwrap();

    assert!((total_length(&out) - 120.0).abs() < 1e-9, "length {}", total_length(&out));
    for s in &out {
        let m = s.midpoint();
        let in_centre = m.x > 10.0 && m.x < 20.0 && m.y > 10.0 && m.y < 20.0;
        assert!(!in_centre, "segment {s:?} lies inside the union");
    }
}

#[test]
fn test_union_reports_progress() {
    let polys: Vec<_> = (0..8)
        .map(|i| rect(i as f64 * 5.0, 0.0, i as f64 * 5.0 + 8.0, 8.0))
        .collect();
    let mut statuses: Vec<Status> = Vec::new();
    polygon_union(polys, &TaskPool::new(3), &mut statuses).unwrap();

    assert!(!statuses.is_empty());
    let partitions: std::collections::BTreeSet<_> =
        statuses.iter().filter_map(|s| s.partition).collect();
    assert_eq!(partitions.len(), 3);
    assert!(statuses
        .iter()
        .filter_map(|s| s.progress)
        .all(|Progress { value, max }| value <= max));
}
