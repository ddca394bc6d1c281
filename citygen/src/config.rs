use crate::error::{Error, Result};
use crate::geometry::limits::in_width_bounds;
use serde::{Deserialize, Serialize};

/// Trees per square unit: 1300 trees on a 13 000 x 13 000 area.
pub const DEFAULT_TREE_DENSITY: f64 = 1300.0 / 169_000_000.0;
pub const DEFAULT_SEED: u64 = 42;

/// Generation tunables. Every field has a default, so partial documents load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldConfig {
    pub road_width: f64,
    pub road_roundness: u32,
    pub min_building_length: f64,
    pub building_width: f64,
    pub spacing: f64,
    pub tree_size: f64,
    /// `[near, far]` multipliers of `tree_size`.
    pub spawn_range: [f64; 2],
    pub tree_density: f64,
    pub tree_strips: usize,
    pub max_tree_attempts: u32,
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            road_width: 120.0,
            road_roundness: 20,
            min_building_length: 150.0,
            building_width: 200.0,
            spacing: 50.0,
            tree_size: 150.0,
            spawn_range: [0.7, 3.0],
            tree_density: DEFAULT_TREE_DENSITY,
            tree_strips: 16,
            max_tree_attempts: 50,
            seed: DEFAULT_SEED,
            workers: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        positive("roadWidth", self.road_width)?;
        positive("buildingWidth", self.building_width)?;
        positive("treeSize", self.tree_size)?;
        non_negative("minBuildingLength", self.min_building_length)?;
        non_negative("spacing", self.spacing)?;
        non_negative("treeDensity", self.tree_density)?;

        let [near, far] = self.spawn_range;
        if !(near.is_finite() && far.is_finite()) || near < 0.0 || near > far {
            return Err(Error::config(
                "spawnRange",
                format!("expected 0 <= near <= far, got [{near}, {far}]"),
            ));
        }
        if self.tree_strips == 0 {
            return Err(Error::config("treeStrips", "must be at least 1"));
        }
        if self.max_tree_attempts == 0 {
            return Err(Error::config("maxTreeAttempts", "must be at least 1"));
        }
        if self.workers == Some(0) {
            return Err(Error::config("workers", "must be at least 1 when set"));
        }
        Ok(())
    }
}

fn positive(param: &'static str, v: f64) -> Result<()> {
    if in_width_bounds(v) {
        Ok(())
    } else {
        Err(Error::config(param, format!("must be positive, finite and at most 1e6, got {v}")))
    }
}

fn non_negative(param: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::config(param, format!("must be non-negative and finite, got {v}")))
    }
}
