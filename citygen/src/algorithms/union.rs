//! Boundary of the union of a set of polygons.
//!
//! The result is a segment soup, not a set of rings:
//! 1. bounding-box candidates are collected per polygon;
//! 2. every polygon's segments are split at interior crossings with each of
//!    its candidates (in parallel, by polygon index range);
//! 3. a split segment survives iff its midpoint is outside every candidate.
//!
//! Non-simple input polygons give undefined boundary quality.

use crate::error::Result;
use crate::geometry::intersect::intersect_segments;
use crate::geometry::polygon::Polygon;
use crate::model::Segment;
use crate::tasks::{ProgressSink, Reporter, TaskPool};
use log::debug;
use std::ops::Range;

/// Indices of the polygons whose bounding boxes overlap polygon `i`'s.
pub fn candidates(polygons: &[Polygon]) -> Vec<Vec<usize>> {
    let bounds: Vec<_> = polygons.iter().map(Polygon::bounds).collect();
    (0..polygons.len())
        .map(|i| {
            (0..polygons.len())
                .filter(|&j| {
                    j != i
                        && matches!((&bounds[i], &bounds[j]), (Some(a), Some(b)) if a.overlaps(b))
                })
                .collect()
        })
        .collect()
}

/// Splits the segments of `a` and `b` at every interior crossing.
///
/// A split shortens the segment to end at the crossing and inserts the
/// remainder right after it, so the remainder is tested against the rest of
/// the other polygon in the same pass. Endpoint touches are not split.
pub fn break_polygons(a: &mut Polygon, b: &mut Polygon) {
    let mut i = 0;
    while i < a.segments.len() {
        let mut j = 0;
        while j < b.segments.len() {
            let (s1, s2) = (a.segments[i], b.segments[j]);
            match intersect_segments(s1.p1, s1.p2, s2.p1, s2.p2) {
                Some(hit) if hit.is_interior() => {
                    let rest = a.segments[i].break_at(hit.point);
                    a.segments.insert(i + 1, rest);
                    let rest = b.segments[j].break_at(hit.point);
                    b.segments.insert(j + 1, rest);
                    j += 1;
                }
                _ => {}
            }
            j += 1;
        }
        i += 1;
    }
}

fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Splits polygons `range` against their candidates; returns just that range.
pub fn break_partition(
    mut polygons: Vec<Polygon>,
    candidates: &[Vec<usize>],
    range: Range<usize>,
    reporter: Option<&Reporter>,
) -> Vec<Polygon> {
    let total = range.len() as u64;
    for (done, i) in range.clone().enumerate() {
        for &j in &candidates[i] {
            let (a, b) = pair_mut(&mut polygons, i, j);
            break_polygons(a, b);
        }
        if let Some(r) = reporter {
            r.progress(done as u64 + 1, total);
        }
    }
    polygons.drain(range).collect()
}

/// Splits every polygon against its candidates using the pool.
///
/// Each partition works on its own copy of all polygons and only its own
/// index range is merged back.
pub fn split_all(
    polygons: &mut [Polygon],
    candidates: &[Vec<usize>],
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    let ranges = pool.partition(polygons.len());
    let jobs: Vec<_> = ranges
        .iter()
        .cloned()
        .map(|range| {
            let copy = polygons.to_vec();
            move |r: &Reporter| Ok(break_partition(copy, candidates, range, Some(r)))
        })
        .collect();
    let parts = pool.fan_out("union", jobs, sink)?;
    for (range, part) in ranges.into_iter().zip(parts) {
        for (slot, poly) in polygons[range].iter_mut().zip(part) {
            *slot = poly;
        }
    }
    Ok(())
}

/// Keeps each segment whose midpoint lies outside all of its polygon's candidates.
pub fn boundary_segments(polygons: &[Polygon], candidates: &[Vec<usize>]) -> Vec<Segment> {
    let mut kept = Vec::new();
    for (i, poly) in polygons.iter().enumerate() {
        for seg in &poly.segments {
            let mid = seg.midpoint();
            if !candidates[i].iter().any(|&j| polygons[j].contains_point(mid)) {
                kept.push(*seg);
            }
        }
    }
    kept
}

/// Outer boundary of the union of `polygons` as a segment soup.
pub fn polygon_union(
    mut polygons: Vec<Polygon>,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<Segment>> {
    if polygons.is_empty() {
        return Ok(Vec::new());
    }
    let candidates = candidates(&polygons);
    let pairs: usize = candidates.iter().map(Vec::len).sum();
    debug!("union: {} polygons, {} candidate pairs", polygons.len(), pairs / 2);
    if pairs > 0 {
        split_all(&mut polygons, &candidates, pool, sink)?;
    }
    let boundary = boundary_segments(&polygons, &candidates);
    debug!("union: {} boundary segments", boundary.len());
    Ok(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use crate::tasks::NoProgress;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    #[test]
    fn crossing_squares_split_both() {
        let mut a = rect(0.0, 0.0, 10.0, 10.0);
        let mut b = rect(5.0, 5.0, 15.0, 15.0);
        break_polygons(&mut a, &mut b);
        assert_eq!(a.segments.len(), 6);
        assert_eq!(b.segments.len(), 6);
    }

    #[test]
    fn overlapping_squares_union_perimeter() {
        let polys = vec![rect(0.0, 0.0, 10.0, 10.0), rect(5.0, 5.0, 15.0, 15.0)];
        let out = polygon_union(polys, &TaskPool::new(2), &mut NoProgress).unwrap();
        let perimeter: f64 = out.iter().map(Segment::length).sum();
        assert!((perimeter - 60.0).abs() < 1e-9, "perimeter {perimeter}");
        assert!(out.iter().all(|s| {
            let m = s.midpoint();
            !(m.x > 5.0 && m.x < 10.0 && m.y > 5.0 && m.y < 10.0)
        }));
    }

    #[test]
    fn partitioned_split_matches_single_worker() {
        let polys: Vec<_> = (0..6)
            .map(|i| rect(i as f64 * 4.0, 0.0, i as f64 * 4.0 + 6.0, 6.0 + i as f64))
            .collect();
        let one = polygon_union(polys.clone(), &TaskPool::new(1), &mut NoProgress).unwrap();
        let many = polygon_union(polys, &TaskPool::new(4), &mut NoProgress).unwrap();
        assert_eq!(one.len(), many.len());
        let len = |segs: &[Segment]| segs.iter().map(Segment::length).sum::<f64>();
        assert!((len(&one) - len(&many)).abs() < 1e-6);
    }

    #[test]
    fn empty_input_gives_empty_boundary() {
        assert!(polygon_union(Vec::new(), &TaskPool::new(2), &mut NoProgress).unwrap().is_empty());
    }
}
