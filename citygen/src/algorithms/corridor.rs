//! Buffered shortest path between two arbitrary points.

use super::roads::buffer_union;
use super::router::route;
use crate::error::Result;
use crate::geometry::envelope::Envelope;
use crate::graph::Graph;
use crate::model::{Point, PointId, Segment};
use crate::tasks::{ProgressSink, TaskPool};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
pub struct CorridorRequest {
    /// Private copy; attaching endpoints mutates it.
    pub graph: Graph,
    pub start: Point,
    pub end: Point,
    pub road_width: f64,
    pub road_roundness: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub path: Vec<Point>,
    pub borders: Vec<Segment>,
}

/// Makes `p` routable inside `graph` and returns its id.
///
/// An existing point is used as is. Otherwise the nearest segment is split at
/// its closest point to `p` (unless that is already an endpoint) and a two-way
/// connector joins `p` to the split point. With no segments at all, `p` is
/// added as an isolated point.
pub fn attach(graph: &mut Graph, p: Point) -> Result<PointId> {
    if let Some(id) = graph.find_point(p) {
        return Ok(id);
    }
    let Some(sid) = graph.nearest_segment(p, f64::INFINITY) else {
        return Ok(graph.add_point(p));
    };
    let Some(seg) = graph.segment(sid) else {
        return Ok(graph.add_point(p));
    };
    let joint = graph.break_segment(sid, seg.closest_point(p))?;
    let id = graph.add_point(p);
    if id != joint {
        graph.add_segment(id, joint, false)?;
    }
    debug!("attached ({}, {}) to segment {sid}", p.x, p.y);
    Ok(id)
}

pub fn generate_corridor(
    mut req: CorridorRequest,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<Corridor> {
    let start = attach(&mut req.graph, req.start)?;
    let end = attach(&mut req.graph, req.end)?;
    let path = route(&req.graph, start, end)?;

    let borders = if let [only] = path[..] {
        Envelope::new(Segment::new(only, only), req.road_width, req.road_roundness)?
            .polygon
            .segments
    } else {
        let segments: Vec<_> = path.windows(2).map(|w| Segment::new(w[0], w[1])).collect();
        buffer_union(&segments, req.road_width, req.road_roundness, pool, sink)?.1
    };
    Ok(Corridor { path, borders })
}
