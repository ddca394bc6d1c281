use super::math::{angle_of, average, distance, normalize, translate};
use super::tolerance::EPS_LEN;
use crate::error::Degenerate;
use crate::model::{Point, Segment};

/// Foot of the perpendicular from a point onto a segment's supporting line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub point: Point,
    /// 0 at `p1`, 1 at `p2`; outside [0,1] when the foot misses the segment.
    pub offset: f64,
}

impl Segment {
    #[inline]
    pub fn length(&self) -> f64 {
        distance(self.p1, self.p2)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        average(self.p1, self.p2)
    }

    /// Unit vector from `p1` towards `p2`.
    pub fn direction(&self) -> Result<Point, Degenerate> {
        normalize(self.p2 - self.p1)
    }

    pub fn projection(&self, p: Point) -> Result<Projection, Degenerate> {
        let b = self.p2 - self.p1;
        let unit = normalize(b)?;
        let scalar = (p - self.p1).dot(unit);
        Ok(Projection {
            point: self.p1 + unit * scalar,
            offset: scalar / b.length(),
        })
    }

    /// Distance to the nearest point of the segment.
    pub fn min_dist_to_point(&self, p: Point) -> f64 {
        match self.interior_projection(p) {
            Some(proj) => distance(proj.point, p),
            None => distance(p, self.p1).min(distance(p, self.p2)),
        }
    }

    pub fn closest_point(&self, p: Point) -> Point {
        if self.length() < EPS_LEN {
            return self.p1;
        }
        match self.interior_projection(p) {
            Some(proj) => proj.point,
            None if distance(p, self.p1) < distance(p, self.p2) => self.p1,
            None => self.p2,
        }
    }

    // Projection whose foot falls strictly inside the segment.
    fn interior_projection(&self, p: Point) -> Option<Projection> {
        if self.length() < EPS_LEN {
            return None;
        }
        let proj = self.projection(p).ok()?;
        (proj.offset > 0.0 && proj.offset < 1.0).then_some(proj)
    }

    /// Shortens this segment to end at `at` and returns the remainder `at -> old p2`.
    pub fn break_at(&mut self, at: Point) -> Segment {
        let rest = Segment { p1: at, p2: self.p2, oneway: self.oneway };
        self.p2 = at;
        rest
    }

    /// Segment of `length` centred on `center`, with `p1` ahead along `direction`.
    pub fn centered(center: Point, length: f64, direction: Point) -> Segment {
        let angle = angle_of(direction);
        Segment::new(
            translate(center, length * 0.5, angle),
            translate(center, -length * 0.5, angle),
        )
    }
}
