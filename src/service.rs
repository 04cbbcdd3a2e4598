use std::sync::Arc;

use anyhow::Context;
use fleetnav_kinematics::{DifferentialDrive, Point, Pose};
use fleetnav_navigation::map::{self, MapLayers, RegionSamples};
use fleetnav_navigation::planner::{self, PlannedPath};
use fleetnav_navigation::{
    DecisionPayload, NavigationConfig, NavigationError, PlanningError, RegionGraph, RobotSnapshot,
};
use tracing::{debug, info, warn};

use crate::map_store::MapStore;

/// Boundary of the navigation core: decisions, mapping and planning against
/// the shared map and region graph.
#[derive(Debug, Clone)]
pub struct NavigationService {
    config: Arc<NavigationConfig>,
    drive: DifferentialDrive,
    graph: Arc<RegionGraph>,
    map: MapStore,
}

impl NavigationService {
    pub fn new(
        config: NavigationConfig,
        drive: DifferentialDrive,
        graph: RegionGraph,
        map: MapStore,
    ) -> Self {
        NavigationService {
            config: Arc::new(config),
            drive,
            graph: Arc::new(graph),
            map,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn drive(&self) -> DifferentialDrive {
        self.drive
    }

    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    pub fn map(&self) -> &MapStore {
        &self.map
    }

    pub fn compute_single_decision(&self, robot: RobotSnapshot) -> DecisionPayload {
        fleetnav_navigation::compute_single_decision(robot, &self.config.control, self.drive)
    }

    /// One decision per robot, in input order. A lone robot is decided
    /// inline; larger batches run each arbiter on the blocking pool.
    pub async fn compute_decisions(
        &self,
        mut robots: Vec<RobotSnapshot>,
    ) -> anyhow::Result<Vec<DecisionPayload>> {
        if robots.len() == 1 {
            if let Some(robot) = robots.pop() {
                return Ok(vec![self.compute_single_decision(robot)]);
            }
        }
        let handles: Vec<_> = robots
            .into_iter()
            .map(|robot| {
                let config = Arc::clone(&self.config);
                let drive = self.drive;
                tokio::task::spawn_blocking(move || {
                    fleetnav_navigation::compute_single_decision(robot, &config.control, drive)
                })
            })
            .collect();

        let mut decisions = Vec::with_capacity(handles.len());
        for handle in handles {
            decisions.push(handle.await.context("decision task failed")?);
        }
        Ok(decisions)
    }

    /// Build a map from region samples and make it the current one.
    pub fn build_map(
        &self,
        width: usize,
        height: usize,
        regions: &[RegionSamples],
    ) -> Result<Arc<MapLayers>, NavigationError> {
        let layers = Arc::new(map::build_map(width, height, regions, &self.config.mapping)?);
        self.map.swap(Arc::clone(&layers));
        info!(
            width,
            height,
            regions = regions.len(),
            occupied = layers.opened.occupied_count(),
            "Map rebuilt"
        );
        Ok(layers)
    }

    pub fn try_plan_path(&self, pose: Pose, goal: Point) -> Result<PlannedPath, PlanningError> {
        let layers = self.map.snapshot();
        planner::plan(
            pose,
            goal,
            &self.graph,
            layers.planning_grid(),
            &self.config.planner,
        )
    }

    /// Plan from `pose` to `goal`; empty if no path could be produced.
    pub fn plan_path(&self, pose: Pose, goal: Point) -> Vec<Point> {
        match self.try_plan_path(pose, goal) {
            Ok(path) => {
                debug!(
                    points = path.points.len(),
                    regions = ?path.regions,
                    expansions = path.stats.expansions,
                    "Path planned"
                );
                path.points
            }
            Err(e) => {
                warn!(%goal, error = %e, exhausted = e.is_exhaustion(), "Planning failed");
                Vec::new()
            }
        }
    }
}
