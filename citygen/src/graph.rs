//! Editable point/segment graph.
//!
//! Points live in an id-indexed arena and edges refer to them by id, so moving
//! a point moves every segment touching it. Removed slots are left as
//! tombstones, which keeps ids stable for the lifetime of the graph. Ids are
//! never reused, so [`Graph::point_slots`] grows with every point ever added;
//! saving and reloading the world document yields a dense graph again.
//!
//! Coordinate lookup and duplicate-segment checks go through hash indices, so
//! inserts stay O(1) on large imported documents.

use crate::error::{Error, Result};
use crate::geometry::math::distance;
use crate::model::{Point, PointId, Segment, SegmentId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub a: PointId,
    pub b: PointId,
    #[serde(default)]
    pub oneway: bool,
}

impl Edge {
    #[inline]
    pub fn touches(&self, id: PointId) -> bool {
        self.a == id || self.b == id
    }

    #[inline]
    fn key(&self) -> (PointId, PointId) {
        pair_key(self.a, self.b)
    }
}

// -0.0 and 0.0 compare equal, so they must share a key.
#[inline]
fn coord_key(p: Point) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

#[inline]
fn pair_key(a: PointId, b: PointId) -> (PointId, PointId) {
    (a.min(b), a.max(b))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    points: Vec<Option<Point>>,
    edges: Vec<Option<Edge>>,
    by_coord: HashMap<(u64, u64), PointId>,
    by_pair: HashMap<(PointId, PointId), SegmentId>,
    live_points: usize,
    live_edges: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self) -> usize {
        self.live_points
    }

    pub fn segment_count(&self) -> usize {
        self.live_edges
    }

    pub fn is_empty(&self) -> bool {
        self.live_points == 0
    }

    /// Upper bound on arena ids; every live `PointId` is below it.
    pub fn point_slots(&self) -> usize {
        self.points.len()
    }

    /// C(n, 2) for the current number of points.
    pub fn max_segments(&self) -> usize {
        let n = self.live_points;
        n * n.saturating_sub(1) / 2
    }

    /// Inserts `p`, or returns the id of the point already at that coordinate.
    pub fn add_point(&mut self, p: Point) -> PointId {
        if let Some(id) = self.find_point(p) {
            return id;
        }
        let id = self.points.len() as PointId;
        self.points.push(Some(p));
        self.by_coord.insert(coord_key(p), id);
        self.live_points += 1;
        id
    }

    pub fn find_point(&self, p: Point) -> Option<PointId> {
        self.by_coord.get(&coord_key(p)).copied()
    }

    pub fn get_point(&self, id: PointId) -> Option<Point> {
        self.points.get(id as usize).copied().flatten()
    }

    pub fn point(&self, id: PointId) -> Result<Point> {
        self.get_point(id).ok_or(Error::UnknownPoint(id))
    }

    /// Moves a point. Returns `false` when another point already occupies `to`.
    pub fn move_point(&mut self, id: PointId, to: Point) -> Result<bool> {
        let from = self.point(id)?;
        if matches!(self.find_point(to), Some(other) if other != id) {
            return Ok(false);
        }
        self.by_coord.remove(&coord_key(from));
        self.by_coord.insert(coord_key(to), id);
        self.points[id as usize] = Some(to);
        Ok(true)
    }

    /// Removes a point together with every segment touching it.
    pub fn remove_point(&mut self, id: PointId) -> Result<Point> {
        let p = self.point(id)?;
        for sid in self.segments_of_point(id) {
            self.remove_segment(sid);
        }
        self.points[id as usize] = None;
        self.by_coord.remove(&coord_key(p));
        self.live_points -= 1;
        Ok(p)
    }

    /// Adds an edge between two existing points.
    ///
    /// `Ok(None)` when the edge is a self-loop, already exists in either
    /// direction, or the graph already holds C(n, 2) segments.
    pub fn add_segment(&mut self, a: PointId, b: PointId, oneway: bool) -> Result<Option<SegmentId>> {
        self.point(a)?;
        self.point(b)?;
        if a == b {
            debug!("rejecting self-loop on point {a}");
            return Ok(None);
        }
        if self.contains_segment(a, b) {
            return Ok(None);
        }
        if self.live_edges >= self.max_segments() {
            debug!("graph already holds the maximum number of segments");
            return Ok(None);
        }
        Ok(Some(self.push_edge(Edge { a, b, oneway })))
    }

    fn push_edge(&mut self, edge: Edge) -> SegmentId {
        let id = self.edges.len() as SegmentId;
        self.edges.push(Some(edge));
        self.by_pair.insert(edge.key(), id);
        self.live_edges += 1;
        id
    }

    pub fn remove_segment(&mut self, id: SegmentId) -> Option<Edge> {
        let edge = self.edges.get_mut(id as usize).and_then(Option::take)?;
        self.by_pair.remove(&edge.key());
        self.live_edges -= 1;
        Some(edge)
    }

    pub fn find_segment(&self, a: PointId, b: PointId) -> Option<SegmentId> {
        self.by_pair.get(&pair_key(a, b)).copied()
    }

    pub fn contains_segment(&self, a: PointId, b: PointId) -> bool {
        self.by_pair.contains_key(&pair_key(a, b))
    }

    pub fn edge(&self, id: SegmentId) -> Option<Edge> {
        self.edges.get(id as usize).copied().flatten()
    }

    /// Resolved segment value for an edge id.
    pub fn segment(&self, id: SegmentId) -> Option<Segment> {
        let e = self.edge(id)?;
        Some(Segment {
            p1: self.get_point(e.a)?,
            p2: self.get_point(e.b)?,
            oneway: e.oneway,
        })
    }

    pub fn segments_of_point(&self, id: PointId) -> Vec<SegmentId> {
        self.edges()
            .filter(|(_, e)| e.touches(id))
            .map(|(sid, _)| sid)
            .collect()
    }

    /// Closest point strictly within `threshold` of `loc`.
    pub fn nearest_point(&self, loc: Point, threshold: f64) -> Option<PointId> {
        self.points()
            .map(|(id, p)| (id, distance(loc, p)))
            .filter(|&(_, d)| d < threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Closest segment strictly within `threshold` of `loc`.
    pub fn nearest_segment(&self, loc: Point, threshold: f64) -> Option<SegmentId> {
        self.segments()
            .map(|(id, s)| (id, s.min_dist_to_point(loc)))
            .filter(|&(_, d)| d < threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Splits segment `id` at `at`, the only legal way to subdivide an edge.
    ///
    /// The edge is shortened to end at the break point and a remainder edge
    /// (same `oneway`) covers the rest. Breaking at an existing endpoint
    /// changes nothing. A piece that would duplicate an existing edge is
    /// dropped, the existing edge already covering it. Returns the break
    /// point's id.
    pub fn break_segment(&mut self, id: SegmentId, at: Point) -> Result<PointId> {
        let edge = self.edge(id).ok_or(Error::UnknownSegment(id))?;
        let mid = self.add_point(at);
        if edge.touches(mid) {
            return Ok(mid);
        }
        self.remove_segment(id);
        let head = Edge { b: mid, ..edge };
        if self.contains_segment(head.a, head.b) {
            debug!("segment {id} already covered up to point {mid}");
        } else {
            self.edges[id as usize] = Some(head);
            self.by_pair.insert(head.key(), id);
            self.live_edges += 1;
        }
        if !self.contains_segment(mid, edge.b) {
            self.push_edge(Edge { a: mid, b: edge.b, oneway: edge.oneway });
        }
        Ok(mid)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn points(&self) -> impl Iterator<Item = (PointId, Point)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i as PointId, p)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (SegmentId, Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (i as SegmentId, e)))
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, Segment)> + '_ {
        self.edges().filter_map(move |(id, e)| {
            Some((
                id,
                Segment {
                    p1: self.get_point(e.a)?,
                    p2: self.get_point(e.b)?,
                    oneway: e.oneway,
                },
            ))
        })
    }
}
