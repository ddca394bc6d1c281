//! Single-source shortest path over the road graph.
//!
//! Per-point search state (distance, visited flag, predecessor) lives in an
//! arena indexed by [`PointId`] and scoped to one call, so routing never
//! writes to the graph and concurrent queries over the same graph are safe.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::model::{Point, PointId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug)]
struct NodeState {
    dist: f64,
    visited: bool,
    prev: Option<PointId>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self { dist: f64::INFINITY, visited: false, prev: None }
    }
}

// Min-heap entry: smallest distance first, then earliest discovery.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    dist: f64,
    order: u64,
    id: PointId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Outgoing edges per point, honouring `oneway` (only p1 -> p2).
fn adjacency(graph: &Graph) -> Vec<Vec<(PointId, f64)>> {
    let mut adj = vec![Vec::new(); graph.point_slots()];
    for (_, edge) in graph.edges() {
        let (Some(a), Some(b)) = (graph.get_point(edge.a), graph.get_point(edge.b)) else {
            continue;
        };
        let len = (a - b).length();
        adj[edge.a as usize].push((edge.b, len));
        if !edge.oneway {
            adj[edge.b as usize].push((edge.a, len));
        }
    }
    adj
}

/// Shortest path from `start` to `end` as point ids, both ends included.
///
/// Fails with [`Error::UnknownPoint`] for ids not in the graph and with
/// [`Error::NoPathFound`] when `end` is unreachable.
pub fn shortest_path(graph: &Graph, start: PointId, end: PointId) -> Result<Vec<PointId>> {
    let from = graph.point(start)?;
    let to = graph.point(end)?;
    if start == end {
        return Ok(vec![start]);
    }

    let adj = adjacency(graph);
    let mut state = vec![NodeState::default(); graph.point_slots()];
    let mut heap = BinaryHeap::new();
    let mut order = 0u64;

    state[start as usize].dist = 0.0;
    heap.push(Frontier { dist: 0.0, order, id: start });

    while let Some(Frontier { dist, id, .. }) = heap.pop() {
        let node = &mut state[id as usize];
        if node.visited {
            continue;
        }
        node.visited = true;
        if id == end {
            break;
        }
        for &(next, len) in &adj[id as usize] {
            let candidate = dist + len;
            let n = &mut state[next as usize];
            if !n.visited && candidate < n.dist {
                n.dist = candidate;
                n.prev = Some(id);
                order += 1;
                heap.push(Frontier { dist: candidate, order, id: next });
            }
        }
    }

    if !state[end as usize].visited {
        return Err(Error::NoPathFound { from, to });
    }

    let mut path = vec![end];
    let mut cur = end;
    while let Some(prev) = state[cur as usize].prev {
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    Ok(path)
}

/// [`shortest_path`] resolved to coordinates.
pub fn route(graph: &Graph, start: PointId, end: PointId) -> Result<Vec<Point>> {
    shortest_path(graph, start, end)?
        .into_iter()
        .map(|id| graph.point(id))
        .collect()
}

/// Total length of a polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).length()).sum()
}
