//! World document load/save.

use citygen::{Error, Marking, MarkingKind, NoProgress, Point, World, WorldConfig};
use serde_json::json;

fn small_world() -> World {
    let mut w = World::new(WorldConfig { workers: Some(2), ..WorldConfig::default() }).unwrap();
    let a = w.graph.add_point(Point::new(0.0, 0.0));
    let b = w.graph.add_point(Point::new(1000.0, 0.0));
    let c = w.graph.add_point(Point::new(1000.0, 800.0));
    w.graph.add_segment(a, b, false).unwrap();
    w.graph.add_segment(b, c, true).unwrap();
    w
}

fn expect_malformed(v: serde_json::Value) -> String {
    match World::from_json_value(v) {
        Err(Error::MalformedDocument { context, .. }) => context,
        Err(other) => panic!("expected MalformedDocument, got {other:?}"),
        Ok(_) => panic!("expected MalformedDocument, document loaded"),
    }
}

#[test]
fn test_round_trip_keeps_graph_and_layers() {
    let mut w = small_world();
    w.generate_roads(&mut NoProgress).unwrap();
    w.generate_buildings(&mut NoProgress).unwrap();
    w.add_marking(
        Marking::new(MarkingKind::Crossing, Point::new(500.0, 0.0), Point::new(1.0, 0.0), 120.0, 40.0)
            .unwrap(),
    );

    let text = w.to_json();
    let back = World::from_json(&text).unwrap();
    assert_eq!(back.graph.point_count(), 3);
    assert_eq!(back.graph.segment_count(), 2);
    let oneway: Vec<_> = back.graph.edges().map(|(_, e)| e.oneway).collect();
    assert_eq!(oneway, vec![false, true]);
    assert_eq!(back.roads.len(), w.roads.len());
    assert_eq!(back.road_borders.len(), w.road_borders.len());
    assert_eq!(back.buildings.len(), w.buildings.len());
    assert_eq!(back.markings.len(), 1);
    assert_eq!(back.markings[0].kind(), MarkingKind::Crossing);
    assert_eq!(back.config().road_width, w.config().road_width);
    assert_eq!(back.config().workers, Some(2));
}

fn loop_world() -> World {
    let mut w = World::new(WorldConfig { workers: Some(3), seed: 11, ..WorldConfig::default() }).unwrap();
    let corners = [(0.0, 0.0), (1500.0, 0.0), (1500.0, 1300.0), (0.0, 1300.0)];
    let ids: Vec<_> = corners.iter().map(|&(x, y)| w.graph.add_point(Point::new(x, y))).collect();
    for i in 0..ids.len() {
        w.graph.add_segment(ids[i], ids[(i + 1) % ids.len()], false).unwrap();
    }
    w
}

#[test]
fn test_generated_layers_round_trip_exactly() {
    let mut w = loop_world();
    w.generate_roads(&mut NoProgress).unwrap();
    w.generate_buildings(&mut NoProgress).unwrap();
    w.generate_trees(&mut NoProgress).unwrap();
    w.add_marking(
        Marking::new(MarkingKind::Parking, Point::new(700.0, 3.3), Point::new(0.6, 0.8), 90.0, 45.0)
            .unwrap(),
    );
    assert!(!w.trees.is_empty(), "loop should grow trees");
    assert!(!w.buildings.is_empty(), "loop should get buildings");

    let back = World::from_json(&w.to_json()).unwrap();
    assert!(back.trees == w.trees, "tree radii changed on reload");
    assert!(back.buildings == w.buildings, "building footprints changed on reload");
    assert!(back.roads == w.roads, "road envelopes changed on reload");
    assert!(back.road_borders == w.road_borders);
    assert!(back.markings == w.markings);
}

#[test]
fn test_reload_compacts_point_ids() {
    let mut w = small_world();
    let extra = w.graph.add_point(Point::new(-50.0, 20.0));
    w.graph.add_segment(extra, 0, false).unwrap();
    w.graph.remove_point(1).unwrap();
    assert_eq!(w.graph.point_slots(), 4);

    let back = World::from_json(&w.to_json()).unwrap();
    assert_eq!(back.graph.point_count(), 3);
    assert_eq!(back.graph.point_slots(), 3);
    assert_eq!(back.graph.segment_count(), 1);
    let (_, seg) = back.graph.segments().next().unwrap();
    assert_eq!((seg.p1, seg.p2), (Point::new(-50.0, 20.0), Point::new(0.0, 0.0)));
}

#[test]
fn test_long_chain_document_loads() {
    let n = 40_000usize;
    let points: Vec<_> = (0..n).map(|i| json!({"x": i as f64 * 2.0, "y": (i % 5) as f64})).collect();
    let segments: Vec<_> = (1..n).map(|i| json!({"p1": i - 1, "p2": i})).collect();
    let doc = json!({"graph": {"points": points, "segments": segments}});
    let w = World::from_json_value(doc).unwrap();
    assert_eq!(w.graph.point_count(), n);
    assert_eq!(w.graph.segment_count(), n - 1);
    assert_eq!(w.graph.find_point(Point::new(20.0, 0.0)), Some(10));
}

#[test]
fn test_document_shape() {
    let w = small_world();
    let v = w.to_json_value();
    assert_eq!(v["version"], 1);
    assert_eq!(v["roadWidth"], 120.0);
    assert_eq!(v["graph"]["segments"][1], json!({"p1": 1, "p2": 2, "oneway": true}));
    assert!(v.get("viewport").is_none());
}

#[test]
fn test_legacy_coordinate_endpoints() {
    let doc = json!({
        "graph": {
            "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}],
            "segments": [{"p1": {"x": 0, "y": 0}, "p2": {"x": 10, "y": 0}}]
        },
        "roadWidth": 80
    });
    let w = World::from_json_value(doc).unwrap();
    assert_eq!(w.graph.segment_count(), 1);
    assert_eq!(w.config().road_width, 80.0);
    assert_eq!(w.config().building_width, 200.0);
}

#[test]
fn test_viewport_is_carried() {
    let doc = json!({"viewport": {"zoom": 2.5, "offset": {"x": -10, "y": 4}}});
    let w = World::from_json_value(doc).unwrap();
    let vp = w.viewport.unwrap();
    assert_eq!(vp.zoom, 2.5);
    assert_eq!(w.to_json_value()["viewport"]["offset"]["x"], -10.0);
}

#[test]
fn test_unknown_index_names_the_endpoint() {
    let doc = json!({
        "graph": {
            "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}],
            "segments": [{"p1": 0, "p2": 1}, {"p1": 1, "p2": 7}]
        }
    });
    assert_eq!(expect_malformed(doc), "graph.segments[1].p2");
}

#[test]
fn test_unmatched_coordinate_is_rejected() {
    let doc = json!({
        "graph": {
            "points": [{"x": 0, "y": 0}],
            "segments": [{"p1": {"x": 0, "y": 0}, "p2": {"x": 3, "y": 3}}]
        }
    });
    assert_eq!(expect_malformed(doc), "graph.segments[0].p2");
}

#[test]
fn test_self_loop_is_rejected() {
    let doc = json!({
        "graph": {"points": [{"x": 0, "y": 0}], "segments": [{"p1": 0, "p2": 0}]}
    });
    assert_eq!(expect_malformed(doc), "graph.segments[0]");
}

#[test]
fn test_duplicate_segments_are_dropped() {
    let doc = json!({
        "graph": {
            "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}],
            "segments": [{"p1": 0, "p2": 1}, {"p1": 1, "p2": 0}]
        }
    });
    let w = World::from_json_value(doc).unwrap();
    assert_eq!(w.graph.segment_count(), 1);
}

#[test]
fn test_out_of_bounds_coordinate() {
    let doc = json!({"graph": {"points": [{"x": 0, "y": 0}, {"x": 1e12, "y": 0}]}});
    assert_eq!(expect_malformed(doc), "graph.points[1]");
}

#[test]
fn test_newer_version_is_rejected() {
    assert_eq!(expect_malformed(json!({"version": 2})), "version");
}

#[test]
fn test_bad_json_and_bad_config() {
    assert!(matches!(World::from_json("{not json"), Err(Error::MalformedDocument { .. })));
    assert_eq!(expect_malformed(json!({"graph": {"points": "nope"}})), "document");
    match World::from_json_value(json!({"roadWidth": -1})) {
        Err(Error::InvalidConfig { param, .. }) => assert_eq!(param, "roadWidth"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_marking_tags() {
    let doc = json!({
        "roadMarkings": [serde_json::to_value(
            Marking::new(MarkingKind::TrafficLights, Point::new(0.0, 0.0), Point::new(0.0, 1.0), 60.0, 20.0)
                .unwrap()
        ).unwrap()]
    });
    assert_eq!(doc["roadMarkings"][0]["type"], "trafficLights");
    let mut w = World::from_json_value(doc).unwrap();
    w.update(1000.0);
    match &w.markings[0] {
        Marking::TrafficLights(t) => assert_eq!(t.active_light, 1),
        other => panic!("unexpected {other:?}"),
    }
}
