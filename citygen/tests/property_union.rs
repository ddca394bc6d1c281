use citygen::algorithms::union::polygon_union;
use citygen::algorithms::winding::is_point_inside_polygon;
use citygen::geometry::math::translate;
use citygen::{NoProgress, Point, Polygon, Segment, TaskPool};
use proptest::prelude::*;
use std::f64::consts::PI;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x + w, y + h),
        Point::new(x, y + h),
    ])
}

fn regular(center: Point, radius: f64, sides: usize, rotation: f64) -> Polygon {
    let step = 2.0 * PI / sides as f64;
    Polygon::new(
        (0..sides)
            .map(|i| translate(center, radius, rotation + step * i as f64))
            .collect(),
    )
}

fn rect_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-500i32..500, -500i32..500, 5i32..200, 5i32..200)
        .prop_map(|(x, y, w, h)| (x as f64, y as f64, w as f64, h as f64))
}

fn perimeter(segs: &[Segment]) -> f64 {
    segs.iter().map(Segment::length).sum()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_disjoint_union_is_concatenation(
        a in rect_strategy(),
        gap in 1i32..100,
        b in rect_strategy(),
    ) {
        let pa = rect(a.0, a.1, a.2, a.3);
        // Shift b fully to the right of a.
        let pb = rect(a.0 + a.2 + gap as f64, b.1, b.2, b.3);
        let expected: Vec<Segment> = pa.segments.iter().chain(&pb.segments).copied().collect();
        let out = polygon_union(vec![pa, pb], &TaskPool::new(2), &mut NoProgress).unwrap();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_containing_polygon_wins(
        outer in rect_strategy(),
        fx in 0.1f64..0.4,
        fy in 0.1f64..0.4,
    ) {
        let (x, y, w, h) = outer;
        let big = rect(x, y, w, h);
        let small = rect(x + w * fx, y + h * fy, w * 0.5, h * 0.5);
        let expected = big.segments.clone();
        let out = polygon_union(vec![small, big], &TaskPool::new(2), &mut NoProgress).unwrap();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_convex_centroid_is_inside(
        cx in -1000.0f64..1000.0,
        cy in -1000.0f64..1000.0,
        radius in 1.0f64..300.0,
        sides in 3usize..24,
        rotation in 0.0f64..(2.0 * PI),
    ) {
        let poly = regular(Point::new(cx, cy), radius, sides, rotation);
        let c = poly.centroid().unwrap();
        prop_assert!(is_point_inside_polygon(c, &poly.points));
        let b = poly.bounds().unwrap();
        let far = Point::new(b.max_x + radius + 10.0, b.max_y + 10.0);
        prop_assert!(!is_point_inside_polygon(far, &poly.points));
    }

    #[test]
    fn prop_union_never_grows_the_outline(
        rects in proptest::collection::vec(rect_strategy(), 1..8),
        workers in 1usize..5,
    ) {
        let polys: Vec<Polygon> = rects.iter().map(|&(x, y, w, h)| rect(x, y, w, h)).collect();
        let input: f64 = polys.iter().map(|p| perimeter(&p.segments)).sum();
        let out = polygon_union(polys, &TaskPool::new(workers), &mut NoProgress).unwrap();
        prop_assert!(perimeter(&out) <= input + 1e-6);
    }
}
