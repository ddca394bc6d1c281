//! Road surfaces and their union outline.

use super::union::polygon_union;
use crate::error::Result;
use crate::geometry::envelope::Envelope;
use crate::graph::Graph;
use crate::model::Segment;
use crate::tasks::{ProgressSink, Status, TaskPool};
use log::info;

/// Owned snapshot of what road generation needs.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadRequest {
    pub segments: Vec<Segment>,
    pub road_width: f64,
    pub road_roundness: u32,
}

impl RoadRequest {
    pub fn from_graph(graph: &Graph, road_width: f64, road_roundness: u32) -> Self {
        Self {
            segments: graph.segments().map(|(_, s)| s).collect(),
            road_width,
            road_roundness,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoadNetwork {
    pub roads: Vec<Envelope>,
    pub borders: Vec<Segment>,
}

/// One envelope per segment of `width`, then the union boundary.
pub fn buffer_union(
    segments: &[Segment],
    width: f64,
    roundness: u32,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<(Vec<Envelope>, Vec<Segment>)> {
    let envelopes = segments
        .iter()
        .map(|&s| Envelope::new(s, width, roundness))
        .collect::<Result<Vec<_>, _>>()?;
    let polygons = envelopes.iter().map(|e| e.polygon.clone()).collect();
    let borders = polygon_union(polygons, pool, sink)?;
    Ok((envelopes, borders))
}

pub fn generate_roads(
    req: &RoadRequest,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<RoadNetwork> {
    sink.report(Status::comment("Generating Roads..."));
    let (roads, borders) =
        buffer_union(&req.segments, req.road_width, req.road_roundness, pool, sink)?;
    info!("generated {} road surfaces, {} border segments", roads.len(), borders.len());
    Ok(RoadNetwork { roads, borders })
}

/// Lane centre guides: the union outline of half-width road envelopes.
pub fn lane_guides(
    req: &RoadRequest,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<Segment>> {
    let (_, guides) =
        buffer_union(&req.segments, req.road_width * 0.5, req.road_roundness, pool, sink)?;
    Ok(guides)
}
