//! Rounded buffer ("capsule") around a skeleton segment.
//!
//! Road surfaces, building lots, building footprints and marking frames are
//! all envelopes; footprints use roundness 1, which degenerates each cap into
//! a single edge and yields a rectangle.

use super::math::{angle_of, translate};
use super::polygon::Polygon;
use super::tolerance::clamp_roundness;
use crate::error::Degenerate;
use crate::model::Segment;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub skeleton: Segment,
    pub width: f64,
    pub roundness: u32,
    pub polygon: Polygon,
}

impl Envelope {
    /// Builds the envelope polygon. `roundness` is clamped to [1, 20]; each cap
    /// gets `roundness + 1` points at radius `width / 2`.
    pub fn new(skeleton: Segment, width: f64, roundness: u32) -> Result<Self, Degenerate> {
        if !(width.is_finite() && width > 0.0) {
            return Err(Degenerate::InvalidWidth(width));
        }
        let roundness = clamp_roundness(roundness);
        let polygon = capsule(&skeleton, width * 0.5, roundness);
        Ok(Self { skeleton, width, roundness, polygon })
    }
}

fn capsule(skeleton: &Segment, radius: f64, roundness: u32) -> Polygon {
    let Segment { p1, p2, .. } = *skeleton;
    // Direction pointing away from p2, so the p1 cap bulges outwards.
    let alpha = angle_of(p1 - p2);
    let start = alpha - FRAC_PI_2;
    let step = PI / roundness as f64;

    let mut points = Vec::with_capacity(2 * (roundness as usize + 1));
    for k in 0..=roundness {
        points.push(translate(p1, radius, start + step * k as f64));
    }
    for k in 0..=roundness {
        points.push(translate(p2, radius, PI + start + step * k as f64));
    }
    Polygon::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::math::distance;
    use crate::model::Point;

    #[test]
    fn cap_point_count_follows_roundness() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let env = Envelope::new(s, 20.0, 8).unwrap();
        assert_eq!(env.polygon.points.len(), 18);
        let env = Envelope::new(s, 20.0, 50).unwrap();
        assert_eq!(env.roundness, 20);
        let env = Envelope::new(s, 20.0, 0).unwrap();
        assert_eq!(env.roundness, 1);
        assert_eq!(env.polygon.points.len(), 4);
    }

    #[test]
    fn rectangle_for_roundness_one() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let env = Envelope::new(s, 4.0, 1).unwrap();
        assert!((env.polygon.area() - 40.0).abs() < 1e-9);
        assert!(env.polygon.contains_point(Point::new(5.0, 1.5)));
        assert!(!env.polygon.contains_point(Point::new(5.0, 2.5)));
    }

    #[test]
    fn rejects_bad_width() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert_eq!(Envelope::new(s, 0.0, 4), Err(Degenerate::InvalidWidth(0.0)));
        assert!(Envelope::new(s, f64::NAN, 4).is_err());
    }

    #[test]
    fn cap_bulges_away_from_the_segment() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let env = Envelope::new(s, 2.0, 10).unwrap();
        let min_x = env.polygon.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = env.polygon.points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert!((min_x + 1.0).abs() < 1e-9);
        assert!((max_x - 11.0).abs() < 1e-9);
        assert!(env.polygon.points.iter().all(|&p| {
            distance(p, s.p1).min(distance(p, s.p2)) <= 1.0 + 1e-9
        }));
    }
}
