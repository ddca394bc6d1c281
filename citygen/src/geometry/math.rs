use super::tolerance::EPS_LEN;
use crate::error::Degenerate;
use crate::model::Point;
use log::warn;

#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

#[inline]
pub fn average(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Angle of `v` measured from the +x axis, in radians.
#[inline]
pub fn angle_of(v: Point) -> f64 {
    v.y.atan2(v.x)
}

/// Moves `p` by `offset` along `angle`.
#[inline]
pub fn translate(p: Point, offset: f64, angle: f64) -> Point {
    Point::new(p.x + angle.cos() * offset, p.y + angle.sin() * offset)
}

#[inline]
pub fn perpendicular(v: Point) -> Point {
    Point::new(-v.y, v.x)
}

#[inline]
pub fn magnitude(v: Point) -> f64 {
    v.length()
}

pub fn normalize(v: Point) -> Result<Point, Degenerate> {
    let m = magnitude(v);
    if m < EPS_LEN {
        return Err(Degenerate::ZeroLength);
    }
    Ok(v * (1.0 / m))
}

/// [`normalize`], falling back to the zero vector for degenerate input.
pub fn normalize_or_zero(v: Point) -> Point {
    match normalize(v) {
        Ok(n) => n,
        Err(e) => {
            warn!("{e} ({}, {}); using zero vector", v.x, v.y);
            Point::ZERO
        }
    }
}
