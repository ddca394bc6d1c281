// Centralized tolerances for generation and routing

pub const EPS_DENOM: f64 = 1e-3;          // parallel-line guard for segment intersection
pub const EPS_LEN: f64 = 1e-3;            // zero-length segment / vector threshold
pub const EPS_PARAM: f64 = 1e-9;          // interior-crossing slack on t/u parameters

// Spacing comparisons between building footprints are rounded first
pub const SPACING_DECIMALS: i32 = 2;

// Envelope cap resolution
pub const MIN_ROUNDNESS: u32 = 1;
pub const MAX_ROUNDNESS: u32 = 20;

#[inline]
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}

#[inline]
pub fn clamp_roundness(r: u32) -> u32 { r.clamp(MIN_ROUNDNESS, MAX_ROUNDNESS) }
