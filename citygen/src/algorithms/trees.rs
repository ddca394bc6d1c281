//! Stochastic tree scattering along roads and buildings.
//!
//! The region is sliced into vertical strips that are sampled independently
//! (one job per strip, each with its own seeded stream), then a merge pass
//! drops cross-strip neighbours closer than the tree size.

use crate::error::Result;
use crate::geometry::math::{distance, lerp, translate};
use crate::geometry::polygon::Polygon;
use crate::model::{Bounds, Point, Tree};
use crate::tasks::{ProgressSink, Reporter, Status, TaskPool};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const TREE_LEVELS: usize = 7;
pub const TREE_SIDES: usize = 32;
pub const TREE_HEIGHT_COEFF: f64 = 0.17;

impl Tree {
    /// Tree with freshly drawn silhouette radii.
    pub fn generate<R: Rng + ?Sized>(center: Point, size: f64, rng: &mut R) -> Tree {
        let levels: Vec<Vec<f64>> = (0..TREE_LEVELS)
            .map(|level| {
                let t = level as f64 / (TREE_LEVELS - 1) as f64;
                let radius = lerp(size, size * 0.25, t) * 0.5;
                (0..TREE_SIDES)
                    .map(|_| radius * (rng.gen::<f64>() * 0.5 + 0.5))
                    .collect()
            })
            .collect();
        let base = level_polygon(center, &levels[0]);
        Tree { center, size, height_coeff: TREE_HEIGHT_COEFF, levels, base }
    }

    /// Silhouette of `level` centred on `center`; `None` past the last level.
    pub fn level_polygon(&self, center: Point, level: usize) -> Option<Polygon> {
        self.levels.get(level).map(|radii| level_polygon(center, radii))
    }
}

fn level_polygon(center: Point, radii: &[f64]) -> Polygon {
    let step = 2.0 * PI / radii.len().max(1) as f64;
    Polygon::new(
        radii
            .iter()
            .enumerate()
            .map(|(i, &r)| translate(center, r, i as f64 * step))
            .collect(),
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeRequest {
    pub region: Bounds,
    pub tree_size: f64,
    /// `[near, far]` multipliers of `tree_size`.
    pub spawn_range: [f64; 2],
    pub occupied: Vec<Polygon>,
    pub density: f64,
    pub strips: usize,
    pub max_attempts: u32,
    pub seed: u64,
}

impl TreeRequest {
    /// Absolute `[near, far]` distances.
    pub fn band(&self) -> (f64, f64) {
        (self.spawn_range[0] * self.tree_size, self.spawn_range[1] * self.tree_size)
    }
}

/// Acceptance test for a candidate tree centre.
///
/// The point must lie outside every occupied polygon and farther than `near`
/// from each boundary, farther than `size` from every accepted centre, and
/// closer than `far` to the boundary of at least one occupied polygon.
pub fn accepts(
    p: Point,
    occupied: &[Polygon],
    accepted: &[Point],
    size: f64,
    near: f64,
    far: f64,
) -> bool {
    let clear = occupied
        .iter()
        .all(|poly| !poly.contains_point(p) && poly.min_dist_from_point(p) > near);
    clear
        && accepted.iter().all(|&t| distance(t, p) > size)
        && occupied.iter().any(|poly| poly.min_dist_from_point(p) < far)
}

/// Strip `i` of `n` over `region`; even strips are inset by `0.55 * size` on
/// both sides. `None` when nothing is left of the strip.
pub fn strip_bounds(region: &Bounds, i: usize, n: usize, size: f64) -> Option<Bounds> {
    let offset = if i % 2 == 0 { size * 0.55 } else { 0.0 };
    let left = lerp(region.min_x, region.max_x, i as f64 / n as f64) + offset;
    let right = region.min_x + region.width() / n as f64 * (i + 1) as f64 - offset;
    (right > left && region.height() > 0.0)
        .then(|| Bounds::new(left, region.min_y, right, region.max_y))
}

/// Inputs of one strip job.
#[derive(Clone, Debug)]
pub struct StripJob {
    pub strip: Bounds,
    pub occupied: Vec<Polygon>,
    pub tree_size: f64,
    pub near: f64,
    pub far: f64,
    pub max_trees: usize,
    pub max_attempts: u32,
    pub seed: u64,
}

/// Rejection sampling inside one strip.
///
/// Stops after `max_attempts` consecutive rejections or once `max_trees`
/// trees were accepted.
pub fn sample_strip(job: &StripJob, reporter: Option<&Reporter>) -> Vec<Tree> {
    let mut rng = ChaCha8Rng::seed_from_u64(job.seed);
    let mut centers: Vec<Point> = Vec::new();
    let mut trees = Vec::new();
    let mut misses = 0u32;
    while misses < job.max_attempts && trees.len() < job.max_trees {
        let p = Point::new(
            lerp(job.strip.min_x, job.strip.max_x, rng.gen::<f64>()),
            lerp(job.strip.min_y, job.strip.max_y, rng.gen::<f64>()),
        );
        if accepts(p, &job.occupied, &centers, job.tree_size, job.near, job.far) {
            centers.push(p);
            trees.push(Tree::generate(p, job.tree_size, &mut rng));
            misses = 0;
            if let Some(r) = reporter {
                r.progress(trees.len() as u64, job.max_trees as u64);
            }
        } else {
            misses += 1;
        }
    }
    trees
}

/// Drops every tree within `size` of an earlier kept tree.
pub fn prune_conflicts(trees: Vec<Tree>, size: f64) -> Vec<Tree> {
    let mut kept: Vec<Tree> = Vec::with_capacity(trees.len());
    for tree in trees {
        if kept.iter().all(|k| distance(k.center, tree.center) > size) {
            kept.push(tree);
        }
    }
    kept
}

/// Folds per-strip counts into one running total before forwarding.
struct TreeTally<'a> {
    inner: &'a mut dyn ProgressSink,
    per_strip: BTreeMap<usize, (u64, u64)>,
}

impl ProgressSink for TreeTally<'_> {
    fn report(&mut self, status: Status) {
        match (status.partition, status.progress) {
            (Some(partition), Some(p)) => {
                self.per_strip.insert(partition, (p.value, p.max));
                let (value, max) = self
                    .per_strip
                    .values()
                    .fold((0, 0), |(v, m), &(pv, pm)| (v + pv, m + pm));
                self.inner.report(Status::progress(value, max));
            }
            _ => self.inner.report(status),
        }
    }
}

pub fn strip_jobs(req: &TreeRequest) -> Vec<StripJob> {
    let (near, far) = req.band();
    (0..req.strips)
        .filter_map(|i| {
            let strip = strip_bounds(&req.region, i, req.strips, req.tree_size)?;
            let reach = strip.expanded(far);
            let occupied: Vec<Polygon> = req
                .occupied
                .iter()
                .filter(|poly| matches!(poly.bounds(), Some(b) if b.overlaps(&reach)))
                .cloned()
                .collect();
            Some(StripJob {
                strip,
                occupied,
                tree_size: req.tree_size,
                near,
                far,
                max_trees: (strip.area() * req.density).floor() as usize,
                max_attempts: req.max_attempts,
                seed: req.seed.wrapping_add(i as u64),
            })
        })
        .collect()
}

pub fn generate_trees(
    req: &TreeRequest,
    pool: &TaskPool,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<Tree>> {
    sink.report(Status::comment("Generating Trees..."));
    let jobs: Vec<_> = strip_jobs(req)
        .into_iter()
        .map(|job| move |r: &Reporter| Ok(sample_strip(&job, Some(r))))
        .collect();
    debug!("trees: {} strip(s) over {:?}", jobs.len(), req.region);

    let mut tally = TreeTally { inner: sink, per_strip: BTreeMap::new() };
    let per_strip = pool.fan_out("trees", jobs, &mut tally)?;
    let sampled: Vec<Tree> = per_strip.into_iter().flatten().collect();
    let sampled_count = sampled.len();
    let trees = prune_conflicts(sampled, req.tree_size);
    info!("generated {} trees ({} pruned at strip seams)", trees.len(), sampled_count - trees.len());
    Ok(trees)
}
