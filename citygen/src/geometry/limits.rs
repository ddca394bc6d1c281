// Centralized ingestion limits to harden against untrusted world documents

// Scene size caps
pub const MAX_POINTS: usize = 200_000;
pub const MAX_SEGMENTS: usize = 300_000;
pub const MAX_BUILDINGS: usize = 200_000;
pub const MAX_TREES: usize = 500_000;
pub const MAX_MARKINGS: usize = 50_000;

// Polygons
pub const MAX_POLYGON_POINTS: usize = 8_000;

// Numeric bounds
pub const COORD_MIN: f64 = -1.0e9;
pub const COORD_MAX: f64 = 1.0e9;
pub const WIDTH_MAX: f64 = 1.0e6;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn in_width_bounds(w: f64) -> bool { w.is_finite() && w > 0.0 && w <= WIDTH_MAX }
