pub mod config;
pub mod error;
pub mod graph;
pub mod markings;
pub mod model;
pub mod tasks;
pub mod geometry {
    pub mod envelope;
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod polygon;
    pub mod segment;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod buildings;
    pub mod corridor;
    pub mod roads;
    pub mod router;
    pub mod trees;
    pub mod union;
    pub mod winding;
}
mod json;

pub use algorithms::corridor::Corridor;
pub use config::WorldConfig;
pub use error::{Degenerate, Error, Result};
pub use geometry::envelope::Envelope;
pub use geometry::polygon::Polygon;
pub use graph::Graph;
pub use markings::{Marking, MarkingKind};
pub use model::{Bounds, Building, Point, PointId, Segment, SegmentId, Tree, Viewport};
pub use tasks::{NoProgress, Orchestrator, ProgressSink, Status, TaskKind, TaskPool};

use algorithms::buildings::{self, BuildingRequest};
use algorithms::corridor::{self, CorridorRequest};
use algorithms::roads::{self, RoadNetwork, RoadRequest};
use algorithms::trees::{self, TreeRequest};
use log::info;

/// Editable road graph plus everything generated from it.
///
/// Generated layers depend on each other: roads feed buildings, both feed
/// trees. Regenerating a layer clears the layers derived from it.
#[derive(Clone, Debug)]
pub struct World {
    pub graph: Graph,
    config: WorldConfig,
    pub roads: Vec<Envelope>,
    pub road_borders: Vec<Segment>,
    pub buildings: Vec<Building>,
    pub trees: Vec<Tree>,
    pub markings: Vec<Marking>,
    pub viewport: Option<Viewport>,
    corridor: Option<Corridor>,
    orchestrator: Orchestrator,
}

impl Default for World {
    fn default() -> Self {
        Self::with_orchestrator(WorldConfig::default(), Orchestrator::default())
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.workers {
            Some(n) => TaskPool::new(n),
            None => TaskPool::with_available_parallelism(),
        };
        Ok(Self::with_orchestrator(config, Orchestrator::new(pool)))
    }

    fn with_orchestrator(config: WorldConfig, orchestrator: Orchestrator) -> Self {
        Self {
            graph: Graph::new(),
            config,
            roads: Vec::new(),
            road_borders: Vec::new(),
            buildings: Vec::new(),
            trees: Vec::new(),
            markings: Vec::new(),
            viewport: None,
            corridor: None,
            orchestrator,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Replaces the tunables. Generated layers are kept until regenerated.
    pub fn set_config(&mut self, config: WorldConfig) -> Result<()> {
        config.validate()?;
        if config.workers != self.config.workers {
            let pool = match config.workers {
                Some(n) => TaskPool::new(n),
                None => TaskPool::with_available_parallelism(),
            };
            self.orchestrator = Orchestrator::new(pool);
        }
        self.config = config;
        Ok(())
    }

    /// Shared pool and busy guard; clone it to run requests off this thread.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    // ---- requests ----

    pub fn road_request(&self) -> RoadRequest {
        RoadRequest::from_graph(&self.graph, self.config.road_width, self.config.road_roundness)
    }

    pub fn building_request(&self) -> BuildingRequest {
        BuildingRequest::from_graph(&self.graph, &self.config)
    }

    /// `None` when there is nothing to grow trees around.
    pub fn tree_request(&self) -> Option<TreeRequest> {
        let region = self.tree_region()?;
        let cfg = &self.config;
        Some(TreeRequest {
            region,
            tree_size: cfg.tree_size,
            spawn_range: cfg.spawn_range,
            occupied: self.occupied_space(),
            density: cfg.tree_density,
            strips: cfg.tree_strips,
            max_attempts: cfg.max_tree_attempts,
            seed: cfg.seed,
        })
    }

    pub fn corridor_request(&self, start: Point, end: Point) -> CorridorRequest {
        CorridorRequest {
            graph: self.graph.clone(),
            start,
            end,
            road_width: self.config.road_width,
            road_roundness: self.config.road_roundness,
        }
    }

    /// Floored bounding box of road border endpoints and building vertices.
    pub fn tree_region(&self) -> Option<Bounds> {
        let border_points = self.road_borders.iter().flat_map(|s| [s.p1, s.p2]);
        let building_points = self.buildings.iter().flat_map(|b| b.base.points.iter().copied());
        Bounds::from_points(border_points.chain(building_points)).map(|b| b.floored())
    }

    /// Building footprints followed by road surfaces.
    pub fn occupied_space(&self) -> Vec<Polygon> {
        self.buildings
            .iter()
            .map(|b| b.base.clone())
            .chain(self.roads.iter().map(|r| r.polygon.clone()))
            .collect()
    }

    // ---- generation ----

    pub fn generate_roads(&mut self, sink: &mut dyn ProgressSink) -> Result<()> {
        let req = self.road_request();
        let network = self
            .orchestrator
            .run(TaskKind::Roads, |pool| roads::generate_roads(&req, pool, sink))?;
        self.apply_roads(network);
        Ok(())
    }

    /// Half-width union outline used to snap markings; not stored.
    pub fn lane_guides(&self, sink: &mut dyn ProgressSink) -> Result<Vec<Segment>> {
        let req = self.road_request();
        self.orchestrator
            .run(TaskKind::LaneGuides, |pool| roads::lane_guides(&req, pool, sink))
    }

    pub fn generate_buildings(&mut self, sink: &mut dyn ProgressSink) -> Result<()> {
        let req = self.building_request();
        let buildings = self
            .orchestrator
            .run(TaskKind::Buildings, |pool| buildings::generate_buildings(&req, pool, sink))?;
        self.apply_buildings(buildings);
        Ok(())
    }

    pub fn generate_trees(&mut self, sink: &mut dyn ProgressSink) -> Result<()> {
        let Some(req) = self.tree_request() else {
            info!("no roads or buildings to place trees around");
            self.apply_trees(Vec::new());
            return Ok(());
        };
        let trees = self
            .orchestrator
            .run(TaskKind::Trees, |pool| trees::generate_trees(&req, pool, sink))?;
        self.apply_trees(trees);
        Ok(())
    }

    /// Routes between two arbitrary points and buffers the path.
    ///
    /// The graph is left untouched; the result replaces the previous corridor.
    pub fn generate_corridor(
        &mut self,
        start: Point,
        end: Point,
        sink: &mut dyn ProgressSink,
    ) -> Result<&Corridor> {
        let req = self.corridor_request(start, end);
        let found = self
            .orchestrator
            .run(TaskKind::Corridor, |pool| corridor::generate_corridor(req, pool, sink))?;
        Ok(self.corridor.insert(found))
    }

    pub fn corridor(&self) -> Option<&Corridor> {
        self.corridor.as_ref()
    }

    pub fn clear_corridor(&mut self) {
        self.corridor = None;
    }

    // ---- results computed elsewhere ----

    pub fn apply_roads(&mut self, network: RoadNetwork) {
        self.roads = network.roads;
        self.road_borders = network.borders;
        self.buildings.clear();
        self.trees.clear();
        self.markings.clear();
        self.corridor = None;
    }

    pub fn apply_buildings(&mut self, buildings: Vec<Building>) {
        self.buildings = buildings;
        self.trees.clear();
    }

    pub fn apply_trees(&mut self, trees: Vec<Tree>) {
        self.trees = trees;
    }

    // ---- markings ----

    pub fn add_marking(&mut self, marking: Marking) -> usize {
        self.markings.push(marking);
        self.markings.len() - 1
    }

    pub fn remove_marking(&mut self, index: usize) -> Option<Marking> {
        (index < self.markings.len()).then(|| self.markings.remove(index))
    }

    /// Advances animated markings by `dt` milliseconds.
    pub fn update(&mut self, dt: f64) {
        for m in &mut self.markings {
            m.update(dt);
        }
    }

    /// Drops the graph and every generated layer; config and viewport stay.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.roads.clear();
        self.road_borders.clear();
        self.buildings.clear();
        self.trees.clear();
        self.markings.clear();
        self.corridor = None;
    }

    // ---- document ----

    pub fn to_json_value(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }

    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<Self> {
        json::from_json_impl(v)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let v: serde_json::Value =
            serde_json::from_str(s).map_err(|e| Error::malformed("document", e.to_string()))?;
        Self::from_json_value(v)
    }
}
