//! Building lots along the roads.
//!
//! Wide "lot" envelopes around every road segment are unioned; sufficiently
//! long boundary segments become guides, guides are cut into evenly sized
//! supports, each support becomes a rectangular footprint, and footprints
//! that collide with an earlier one are dropped.

use super::union::polygon_union;
use crate::config::WorldConfig;
use crate::error::Result;
use crate::geometry::envelope::Envelope;
use crate::geometry::polygon::Polygon;
use crate::geometry::tolerance::{round_to, SPACING_DECIMALS};
use crate::graph::Graph;
use crate::model::{Building, Segment};
use crate::tasks::{ProgressSink, Status, TaskPool};
use log::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingRequest {
    pub segments: Vec<Segment>,
    pub road_width: f64,
    pub road_roundness: u32,
    pub min_building_length: f64,
    pub building_width: f64,
    pub spacing: f64,
}

impl BuildingRequest {
    /// Envelope width of a building lot around a road segment.
    pub fn lot_width(&self) -> f64 {
        self.road_width + self.building_width + 8.0 * self.spacing
    }

    pub fn from_graph(graph: &Graph, cfg: &WorldConfig) -> Self {
        Self {
            segments: graph.segments().map(|(_, s)| s).collect(),
            road_width: cfg.road_width,
            road_roundness: cfg.road_roundness,
            min_building_length: cfg.min_building_length,
            building_width: cfg.building_width,
            spacing: cfg.spacing,
        }
    }
}

/// Union boundary segments long enough to host at least one lot.
pub fn guides(boundary: Vec<Segment>, min_building_length: f64, spacing: f64) -> Vec<Segment> {
    let threshold = min_building_length + spacing;
    boundary.into_iter().filter(|s| s.length() >= threshold).collect()
}

/// Cuts a guide into equal slots separated by `spacing`.
///
/// With `count = floor((len + spacing) / (width + spacing))`, every slot is
/// `(len + spacing) / count - spacing` long, so slots and gaps cover the guide.
pub fn support_segments(guide: &Segment, building_width: f64, spacing: f64) -> Vec<Segment> {
    let span = guide.length() + spacing;
    let count = (span / (building_width + spacing)).floor();
    if count < 1.0 {
        return Vec::new();
    }
    let dir = match guide.direction() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("{e}: skipping guide ({}, {}) -> ({}, {})", guide.p1.x, guide.p1.y, guide.p2.x, guide.p2.y);
            return Vec::new();
        }
    };
    let slot = span / count - spacing;
    let step = slot + spacing;
    (0..count as usize)
        .map(|k| {
            let p1 = guide.p1 + dir * (step * k as f64);
            Segment::new(p1, p1 + dir * slot)
        })
        .collect()
}

/// Two footprints conflict when they touch or sit closer than `spacing`
/// (distance rounded to two decimals).
pub fn footprints_conflict(a: &Polygon, b: &Polygon, spacing: f64) -> bool {
    (a.intersection_possible(b) && a.intersects(b))
        || round_to(a.min_dist_from_polygon(b), SPACING_DECIMALS) < spacing
}

/// Greedy keep-first filter: a footprint survives if it conflicts with no
/// earlier survivor.
pub fn filter_footprints(
    bases: Vec<Polygon>,
    spacing: f64,
    sink: &mut dyn ProgressSink,
) -> Vec<Polygon> {
    let total = bases.len() as u64;
    sink.report(Status::comment("Filtering Buildings...").with_progress(0, total));
    let mut kept: Vec<Polygon> = Vec::with_capacity(bases.len());
    for (i, base) in bases.into_iter().enumerate() {
        if !kept.iter().any(|k| footprints_conflict(k, &base, spacing)) {
            kept.push(base);
        }
        sink.report(Status::progress(i as u64 + 1, total));
    }
    kept
}

pub fn generate_buildings(
    req: &BuildingRequest,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<Building>> {
    sink.report(Status::comment("Creating Area..."));
    let lots = req
        .segments
        .iter()
        .map(|&s| Envelope::new(s, req.lot_width(), req.road_roundness).map(|e| e.polygon))
        .collect::<Result<Vec<_>, _>>()?;

    sink.report(Status::comment("Creating Guides..."));
    let boundary = polygon_union(lots, pool, sink)?;
    let guides = guides(boundary, req.min_building_length, req.spacing);

    let total = guides.len() as u64;
    sink.report(Status::comment("Creating Supports...").with_progress(0, total));
    let mut supports = Vec::new();
    for (i, guide) in guides.iter().enumerate() {
        supports.extend(support_segments(guide, req.building_width, req.spacing));
        sink.report(Status::progress(i as u64 + 1, total));
    }

    let total = supports.len() as u64;
    sink.report(Status::comment("Creating Buildings...").with_progress(0, total));
    let mut bases = Vec::with_capacity(supports.len());
    for (i, support) in supports.into_iter().enumerate() {
        bases.push(Envelope::new(support, req.building_width, 1)?.polygon);
        sink.report(Status::progress(i as u64 + 1, total));
    }

    let kept = filter_footprints(bases, req.spacing, sink);
    info!("generated {} buildings from {} guides", kept.len(), guides.len());
    Ok(kept.into_iter().map(Building::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use crate::tasks::NoProgress;

    #[test]
    fn supports_cover_the_guide() {
        let guide = Segment::new(Point::new(0.0, 0.0), Point::new(1000.0, 0.0));
        let supports = support_segments(&guide, 200.0, 50.0);
        // floor(1050 / 250) = 4 slots of 212.5
        assert_eq!(supports.len(), 4);
        assert!((supports[0].length() - 212.5).abs() < 1e-9);
        assert_eq!(supports[0].p1, guide.p1);
        assert!((supports[3].p2.x - 1000.0).abs() < 1e-9);
        for w in supports.windows(2) {
            assert!((w[1].p1.x - w[0].p2.x - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn short_guides_host_nothing() {
        let guide = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(support_segments(&guide, 200.0, 50.0).is_empty());
        let kept = guides(vec![guide], 150.0, 50.0);
        assert!(kept.is_empty());
    }

    #[test]
    fn degenerate_guide_hosts_nothing() {
        // Long enough to fit slots of this width, too short to have a direction.
        let guide = Segment::new(Point::new(3.0, 3.0), Point::new(3.0005, 3.0));
        assert!(guide.direction().is_err());
        assert!(support_segments(&guide, 0.0001, 0.0).is_empty());
    }

    #[test]
    fn straight_road_gets_rows_on_both_sides() {
        let req = BuildingRequest {
            segments: vec![Segment::new(Point::new(0.0, 0.0), Point::new(2000.0, 0.0))],
            road_width: 120.0,
            road_roundness: 20,
            min_building_length: 150.0,
            building_width: 200.0,
            spacing: 50.0,
        };
        let buildings = generate_buildings(&req, &TaskPool::new(2), &mut NoProgress).unwrap();
        assert!(buildings.len() >= 2);
        let above = buildings.iter().filter(|b| b.base.centroid().unwrap().y > 0.0).count();
        assert!(above > 0 && above < buildings.len());
        for b in &buildings {
            assert_eq!(b.levels, 1);
            assert!(!b.base.contains_point(Point::new(1000.0, 0.0)));
        }
    }
}
