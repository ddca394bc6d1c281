use crate::config::WorldConfig;
use crate::error::{Error, Result};
use crate::geometry::envelope::Envelope;
use crate::geometry::limits;
use crate::geometry::polygon::Polygon;
use crate::graph::Graph;
use crate::markings::Marking;
use crate::model::{Building, Point, PointId, Segment, Tree, Viewport};
use crate::World;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOC_VERSION: u32 = 1;

pub fn to_json_impl(w: &World) -> Value {
    #[derive(Serialize)]
    struct SegmentSer {
        p1: u32,
        p2: u32,
        oneway: bool,
    }
    #[derive(Serialize)]
    struct GraphSer {
        points: Vec<Point>,
        segments: Vec<SegmentSer>,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct DocSer<'a> {
        version: u32,
        graph: GraphSer,
        #[serde(flatten)]
        config: &'a WorldConfig,
        roads: &'a [Envelope],
        road_borders: &'a [Segment],
        buildings: &'a [Building],
        trees: &'a [Tree],
        road_markings: &'a [Marking],
        #[serde(skip_serializing_if = "Option::is_none")]
        viewport: Option<Viewport>,
    }

    // Arena ids may have holes; documents use dense indices.
    let mut index: Vec<Option<u32>> = vec![None; w.graph.point_slots()];
    let mut points = Vec::with_capacity(w.graph.point_count());
    for (id, p) in w.graph.points() {
        index[id as usize] = Some(points.len() as u32);
        points.push(p);
    }
    let segments = w
        .graph
        .edges()
        .filter_map(|(_, e)| {
            Some(SegmentSer {
                p1: index[e.a as usize]?,
                p2: index[e.b as usize]?,
                oneway: e.oneway,
            })
        })
        .collect();

    let doc = DocSer {
        version: DOC_VERSION,
        graph: GraphSer { points, segments },
        config: &w.config,
        roads: &w.roads,
        road_borders: &w.road_borders,
        buildings: &w.buildings,
        trees: &w.trees,
        road_markings: &w.markings,
        viewport: w.viewport,
    };
    serde_json::to_value(doc).unwrap_or(Value::Null)
}

/// Legacy documents reference endpoints by coordinate.
#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointDe {
    Index(u32),
    Coord(Point),
}

pub fn from_json_impl(v: Value) -> Result<World> {
    #[derive(Deserialize)]
    struct SegmentDe {
        p1: EndpointDe,
        p2: EndpointDe,
        #[serde(default)]
        oneway: bool,
    }
    #[derive(Deserialize, Default)]
    struct GraphDe {
        #[serde(default)]
        points: Vec<Point>,
        #[serde(default)]
        segments: Vec<SegmentDe>,
    }
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct DocDe {
        version: Option<u32>,
        #[serde(default)]
        graph: GraphDe,
        #[serde(flatten)]
        config: WorldConfig,
        #[serde(default)]
        roads: Vec<Envelope>,
        #[serde(default)]
        road_borders: Vec<Segment>,
        #[serde(default)]
        buildings: Vec<Building>,
        #[serde(default)]
        trees: Vec<Tree>,
        #[serde(default)]
        road_markings: Vec<Marking>,
        viewport: Option<Viewport>,
    }

    let doc: DocDe = serde_json::from_value(v).map_err(|e| Error::malformed("document", e.to_string()))?;
    if let Some(version) = doc.version {
        if version > DOC_VERSION {
            return Err(Error::malformed("version", format!("unsupported version {version}")));
        }
    }
    doc.config.validate()?;

    cap("graph.points", doc.graph.points.len(), limits::MAX_POINTS)?;
    cap("graph.segments", doc.graph.segments.len(), limits::MAX_SEGMENTS)?;
    cap("roadBorders", doc.road_borders.len(), limits::MAX_SEGMENTS)?;
    cap("buildings", doc.buildings.len(), limits::MAX_BUILDINGS)?;
    cap("trees", doc.trees.len(), limits::MAX_TREES)?;
    cap("roadMarkings", doc.road_markings.len(), limits::MAX_MARKINGS)?;

    let mut graph = Graph::new();
    let mut ids: Vec<PointId> = Vec::with_capacity(doc.graph.points.len());
    for (i, &p) in doc.graph.points.iter().enumerate() {
        check_point(&format!("graph.points[{i}]"), p)?;
        if graph.find_point(p).is_some() {
            warn!("graph.points[{i}] repeats an earlier point; merging");
        }
        ids.push(graph.add_point(p));
    }

    for (i, s) in doc.graph.segments.iter().enumerate() {
        let a = resolve(&graph, &ids, &s.p1, || format!("graph.segments[{i}].p1"))?;
        let b = resolve(&graph, &ids, &s.p2, || format!("graph.segments[{i}].p2"))?;
        if a == b {
            return Err(Error::malformed(format!("graph.segments[{i}]"), "segment endpoints are equal"));
        }
        if graph.add_segment(a, b, s.oneway)?.is_none() {
            warn!("dropping duplicate segment graph.segments[{i}]");
        }
    }

    for (i, road) in doc.roads.iter().enumerate() {
        check_polygon(&format!("roads[{i}].polygon"), &road.polygon)?;
    }
    for (i, b) in doc.buildings.iter().enumerate() {
        check_polygon(&format!("buildings[{i}].base"), &b.base)?;
    }
    for (i, t) in doc.trees.iter().enumerate() {
        check_point(&format!("trees[{i}].center"), t.center)?;
        check_polygon(&format!("trees[{i}].base"), &t.base)?;
    }
    for (i, s) in doc.road_borders.iter().enumerate() {
        check_point(&format!("roadBorders[{i}].p1"), s.p1)?;
        check_point(&format!("roadBorders[{i}].p2"), s.p2)?;
    }

    let mut world = World::new(doc.config)?;
    world.graph = graph;
    world.roads = doc.roads;
    world.road_borders = doc.road_borders;
    world.buildings = doc.buildings;
    world.trees = doc.trees;
    world.markings = doc.road_markings;
    world.viewport = doc.viewport;
    Ok(world)
}

fn cap(context: &str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(Error::malformed(context, format!("{len} entries exceed the limit of {max}")));
    }
    Ok(())
}

fn check_point(context: &str, p: Point) -> Result<()> {
    if limits::in_coord_bounds(p.x) && limits::in_coord_bounds(p.y) {
        Ok(())
    } else {
        Err(Error::malformed(context, "coordinate out of bounds"))
    }
}

fn check_polygon(context: &str, poly: &Polygon) -> Result<()> {
    if poly.points.len() > limits::MAX_POLYGON_POINTS
        || poly.segments.len() > limits::MAX_POLYGON_POINTS * 4
    {
        return Err(Error::malformed(context, "polygon too large"));
    }
    for (i, &p) in poly.points.iter().enumerate() {
        check_point(&format!("{context}.points[{i}]"), p)?;
    }
    Ok(())
}

fn resolve(
    graph: &Graph,
    ids: &[PointId],
    end: &EndpointDe,
    context: impl Fn() -> String,
) -> Result<PointId> {
    match *end {
        EndpointDe::Index(index) => ids
            .get(index as usize)
            .copied()
            .ok_or_else(|| Error::malformed(context(), format!("unknown point index {index}"))),
        EndpointDe::Coord(p) => graph
            .find_point(p)
            .ok_or_else(|| Error::malformed(context(), format!("no point at ({}, {})", p.x, p.y))),
    }
}
