//! Road markings placed on the road surface.
//!
//! Every marking shares a frame (centre, direction, width, height) and derives
//! a support segment and a rectangular footprint from it. Borders are the
//! footprint edges other markings snap against.

use crate::error::Degenerate;
use crate::geometry::envelope::Envelope;
use crate::geometry::math::{angle_of, perpendicular, translate};
use crate::geometry::polygon::Polygon;
use crate::model::{Point, Segment};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

pub const LIGHT_BOX_WIDTH: f64 = 25.0;
pub const LIGHT_INTERVAL_MS: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkingKind {
    Crossing,
    Parking,
    TrafficLights,
    Stop,
    Yield,
    Start,
    Target,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub center: Point,
    #[serde(rename = "directionVector")]
    pub direction: Point,
    pub width: f64,
    pub height: f64,
}

/// Support segment, footprint and snapping borders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Painted {
    #[serde(flatten)]
    pub frame: Frame,
    pub support_seg: Segment,
    pub polygon: Polygon,
    #[serde(default)]
    pub borders: Vec<Segment>,
}

impl Painted {
    // Rectangle of `thickness` around `support`, keeping the listed edges.
    fn build(frame: Frame, support: Segment, thickness: f64, border_edges: &[usize]) -> Result<Self, Degenerate> {
        let polygon = Envelope::new(support, thickness, 1)?.polygon;
        let borders = border_edges
            .iter()
            .filter_map(|&i| polygon.segments.get(i).copied())
            .collect();
        Ok(Self { frame, support_seg: support, polygon, borders })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficLights {
    #[serde(flatten)]
    pub frame: Frame,
    pub draw_seg: Segment,
    pub polygon: Polygon,
    pub borders: Vec<Segment>,
    pub angle: f64,
    pub lights: Vec<Point>,
    #[serde(default)]
    pub active_light: usize,
    #[serde(default)]
    pub time: f64,
    #[serde(default = "default_interval")]
    pub interval: f64,
}

fn default_interval() -> f64 {
    LIGHT_INTERVAL_MS
}

impl TrafficLights {
    fn build(frame: Frame) -> Result<Self, Degenerate> {
        let across = perpendicular(frame.direction);
        let length = frame.width - LIGHT_BOX_WIDTH * 1.1;
        let draw_seg = Segment::centered(frame.center, length, across);
        let polygon = Envelope::new(draw_seg, LIGHT_BOX_WIDTH, 1)?.polygon;
        let borders = polygon.segments.get(3).copied().into_iter().collect();
        // p1 -> p2 of the draw segment runs against `across`
        let angle = angle_of(across) + PI;
        let half = length * 0.5;
        let lights = vec![
            translate(frame.center, -half, angle),
            frame.center,
            translate(frame.center, half, angle),
        ];
        Ok(Self {
            frame,
            draw_seg,
            polygon,
            borders,
            angle,
            lights,
            active_light: 0,
            time: 0.0,
            interval: LIGHT_INTERVAL_MS,
        })
    }

    /// Advances the cycle by `dt` milliseconds.
    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        if self.time >= self.interval {
            self.time = 0.0;
            let count = self.lights.len().max(1);
            self.active_light = (self.active_light + 1) % count;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Marking {
    Crossing(Painted),
    Parking {
        #[serde(flatten)]
        painted: Painted,
        angle: f64,
    },
    TrafficLights(TrafficLights),
    Stop(Painted),
    Yield(Painted),
    Start {
        #[serde(flatten)]
        painted: Painted,
        #[serde(rename = "imgAngle")]
        angle: f64,
    },
    Target(Painted),
}

impl Marking {
    pub fn new(kind: MarkingKind, center: Point, direction: Point, width: f64, height: f64) -> Result<Self, Degenerate> {
        let frame = Frame { center, direction, width, height };
        let across = perpendicular(direction);
        let heading = angle_of(direction) - FRAC_PI_2;
        Ok(match kind {
            MarkingKind::Crossing => Marking::Crossing(Painted::build(
                frame,
                Segment::centered(center, width, across),
                height,
                &[1, 3],
            )?),
            MarkingKind::Parking => Marking::Parking {
                painted: Painted::build(frame, Segment::centered(center, height, direction), width, &[0, 2])?,
                angle: heading,
            },
            MarkingKind::TrafficLights => Marking::TrafficLights(TrafficLights::build(frame)?),
            MarkingKind::Stop => Marking::Stop(Painted::build(
                frame,
                Segment::centered(center, height, direction),
                width,
                &[2],
            )?),
            MarkingKind::Yield => Marking::Yield(Painted::build(
                frame,
                Segment::centered(center, height, direction),
                width,
                &[2],
            )?),
            MarkingKind::Start => Marking::Start {
                painted: Painted::build(frame, Segment::centered(center, width, direction), height, &[0, 3])?,
                angle: heading,
            },
            MarkingKind::Target => Marking::Target(Painted::build(
                frame,
                Segment::centered(center, width, direction),
                height,
                &[],
            )?),
        })
    }

    pub fn kind(&self) -> MarkingKind {
        match self {
            Marking::Crossing(_) => MarkingKind::Crossing,
            Marking::Parking { .. } => MarkingKind::Parking,
            Marking::TrafficLights(_) => MarkingKind::TrafficLights,
            Marking::Stop(_) => MarkingKind::Stop,
            Marking::Yield(_) => MarkingKind::Yield,
            Marking::Start { .. } => MarkingKind::Start,
            Marking::Target(_) => MarkingKind::Target,
        }
    }

    pub fn frame(&self) -> &Frame {
        match self {
            Marking::Crossing(p) | Marking::Stop(p) | Marking::Yield(p) | Marking::Target(p) => &p.frame,
            Marking::Parking { painted, .. } | Marking::Start { painted, .. } => &painted.frame,
            Marking::TrafficLights(t) => &t.frame,
        }
    }

    pub fn polygon(&self) -> &Polygon {
        match self {
            Marking::Crossing(p) | Marking::Stop(p) | Marking::Yield(p) | Marking::Target(p) => &p.polygon,
            Marking::Parking { painted, .. } | Marking::Start { painted, .. } => &painted.polygon,
            Marking::TrafficLights(t) => &t.polygon,
        }
    }

    pub fn borders(&self) -> &[Segment] {
        match self {
            Marking::Crossing(p) | Marking::Stop(p) | Marking::Yield(p) | Marking::Target(p) => &p.borders,
            Marking::Parking { painted, .. } | Marking::Start { painted, .. } => &painted.borders,
            Marking::TrafficLights(t) => &t.borders,
        }
    }

    /// Time step in milliseconds; only traffic lights change.
    pub fn update(&mut self, dt: f64) {
        if let Marking::TrafficLights(t) = self {
            t.update(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_origin(kind: MarkingKind) -> Marking {
        Marking::new(kind, Point::new(0.0, 0.0), Point::new(0.0, 1.0), 60.0, 20.0).unwrap()
    }

    #[test]
    fn footprints_are_rectangles() {
        for kind in [
            MarkingKind::Crossing,
            MarkingKind::Parking,
            MarkingKind::Stop,
            MarkingKind::Yield,
            MarkingKind::Start,
            MarkingKind::Target,
        ] {
            let m = at_origin(kind);
            assert_eq!(m.kind(), kind);
            assert_eq!(m.polygon().points.len(), 4);
            assert!((m.polygon().area() - 1200.0).abs() < 1e-6, "{kind:?}");
        }
    }

    #[test]
    fn border_counts() {
        assert_eq!(at_origin(MarkingKind::Crossing).borders().len(), 2);
        assert_eq!(at_origin(MarkingKind::Stop).borders().len(), 1);
        assert_eq!(at_origin(MarkingKind::TrafficLights).borders().len(), 1);
        assert!(at_origin(MarkingKind::Target).borders().is_empty());
    }

    #[test]
    fn lights_cycle_through_three() {
        let mut m = at_origin(MarkingKind::TrafficLights);
        let active = |m: &Marking| match m {
            Marking::TrafficLights(t) => t.active_light,
            _ => unreachable!(),
        };
        m.update(999.0);
        assert_eq!(active(&m), 0);
        m.update(1.0);
        assert_eq!(active(&m), 1);
        m.update(1000.0);
        m.update(1000.0);
        assert_eq!(active(&m), 0);
    }

    #[test]
    fn tagged_json_round_trip() {
        let m = at_origin(MarkingKind::Parking);
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["type"], "parking");
        assert!(v.get("directionVector").is_some());
        let back: Marking = serde_json::from_value(v).unwrap();
        assert_eq!(back.kind(), MarkingKind::Parking);
        assert_eq!(back.polygon().points.len(), 4);
        assert_eq!(back.frame().width, 60.0);
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = Marking::new(MarkingKind::Stop, Point::ZERO, Point::new(1.0, 0.0), 0.0, 10.0);
        assert_eq!(err.unwrap_err(), Degenerate::InvalidWidth(0.0));
    }
}
