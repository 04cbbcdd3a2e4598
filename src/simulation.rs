use std::sync::Arc;

use anyhow::Context;
use fleetnav_kinematics::{Point, Pose};
use fleetnav_navigation::map::RegionSamples;
use fleetnav_navigation::{BehaviorKind, Bounds, DecisionPayload, PidState, RobotSnapshot, RobotStatus};
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, info, warn};

use crate::bus::Topic;
use crate::config::{AppConfig, RobotConfig, SimulationConfig};
use crate::service::NavigationService;

/// Decisions produced on one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub decisions: Vec<DecisionPayload>,
}

/// Simulated robot state carried between ticks.
#[derive(Debug, Clone)]
pub struct SimRobot {
    pub id: u32,
    pub pose: Pose,
    /// Status the robot returns to once a collision clears.
    pub mission: RobotStatus,
    pub status: RobotStatus,
    pub goal: Option<Point>,
    pub mapping_goals: Vec<Point>,
    pub path: Vec<Point>,
    pub previous: Option<BehaviorKind>,
    pub pid: PidState,
}

impl SimRobot {
    pub fn from_config(robot: &RobotConfig) -> Self {
        SimRobot {
            id: robot.id,
            pose: robot.pose,
            mission: robot.status,
            status: robot.status,
            goal: robot.goal,
            mapping_goals: robot.mapping_goals.clone(),
            path: Vec::new(),
            previous: None,
            pid: PidState::zero(),
        }
    }

    /// Nothing left to drive toward.
    pub fn is_done(&self) -> bool {
        self.goal.is_none() && self.mapping_goals.is_empty() && self.path.is_empty()
    }

    /// Drop every target already within `tolerance`.
    fn retire_reached(&mut self, tolerance: f64) {
        let position = self.pose.position;
        let reached = |p: &Point| p.distance(position) < tolerance;

        let passed = self.path.iter().take_while(|p| reached(p)).count();
        self.path.drain(..passed);
        let passed = self.mapping_goals.iter().take_while(|p| reached(p)).count();
        self.mapping_goals.drain(..passed);
        if self.goal.as_ref().is_some_and(reached) {
            info!(robot_id = self.id, goal = %position, "Goal reached");
            self.goal = None;
        }
    }
}

/// Proximity readings and front distances seen from `pose`.
///
/// Readings are the `max_readings` nearest obstacles within range, nearest
/// first, in world frame. Front distances cover obstacles inside the front
/// cone.
pub fn sense(
    pose: &Pose,
    obstacles: &[Point],
    config: &SimulationConfig,
    max_readings: usize,
) -> (Vec<Point>, Vec<f64>) {
    let to_local = pose.inverse();
    let mut in_range: Vec<(f64, Point)> = obstacles
        .iter()
        .map(|o| (o.distance(pose.position), *o))
        .filter(|(d, _)| *d <= config.sensor_range)
        .collect();
    in_range.sort_by(|a, b| a.0.total_cmp(&b.0));

    let front = in_range
        .iter()
        .filter(|(_, o)| to_local.transform_point(*o).angle().abs() <= config.front_half_angle)
        .map(|(d, _)| *d)
        .collect();
    let readings = in_range.iter().take(max_readings).map(|(_, o)| *o).collect();
    (readings, front)
}

/// Attribute each obstacle sample to every region containing it. Without
/// regions the whole environment acts as one.
pub fn region_samples(config: &AppConfig) -> anyhow::Result<Vec<RegionSamples>> {
    if config.regions.is_empty() {
        let env = config.environment;
        return Ok(vec![RegionSamples {
            region_id: 0,
            bounds: Bounds::new(Point::zero(), Point::new(env.width as f64, env.height as f64)),
            samples: config.obstacles.clone(),
        }]);
    }
    config
        .regions
        .iter()
        .map(|r| {
            let region = r.to_region().context("invalid region definition")?;
            let bounds = region.bounds();
            Ok(RegionSamples {
                region_id: region.id,
                bounds,
                samples: config
                    .obstacles
                    .iter()
                    .copied()
                    .filter(|p| bounds.contains(*p))
                    .collect(),
            })
        })
        .collect()
}

pub struct Simulation {
    service: NavigationService,
    robots: Vec<SimRobot>,
    obstacles: Vec<Point>,
    config: SimulationConfig,
    telemetry: Topic<TickReport>,
}

impl Simulation {
    pub fn new(
        service: NavigationService,
        app: &AppConfig,
        telemetry: Topic<TickReport>,
    ) -> Self {
        Simulation {
            service,
            robots: app.robots.iter().map(SimRobot::from_config).collect(),
            obstacles: app.obstacles.clone(),
            config: app.simulation.clone(),
            telemetry,
        }
    }

    #[cfg(test)]
    pub fn robots(&self) -> &[SimRobot] {
        &self.robots
    }

    /// Plan a path for every navigating robot with a goal.
    pub fn plan_routes(&mut self) {
        for robot in &mut self.robots {
            let (RobotStatus::Navigation, Some(goal)) = (robot.mission, robot.goal) else {
                continue;
            };
            robot.path = self.service.plan_path(robot.pose, goal);
            if robot.path.is_empty() {
                warn!(robot_id = robot.id, "No path, steering straight at the goal");
            } else {
                info!(robot_id = robot.id, points = robot.path.len(), "Route assigned");
            }
        }
    }

    fn snapshot(&self, robot: &SimRobot) -> RobotSnapshot {
        let max_readings = self.service.config().control.sensor_weights.len();
        let (readings, front) = sense(&robot.pose, &self.obstacles, &self.config, max_readings);
        let mut snapshot = RobotSnapshot::new(robot.id, robot.pose)
            .with_status(robot.status)
            .with_mapping_goals(robot.mapping_goals.clone())
            .with_path_points(robot.path.clone())
            .with_readings(readings.clone(), front)
            .with_infrared(readings)
            .with_previous(robot.previous, robot.pid);
        snapshot.current_goal = robot.goal;
        snapshot
    }

    /// Advance every robot by one tick.
    pub async fn step(&mut self, tick: u64) -> anyhow::Result<()> {
        let tolerance = self.config.waypoint_tolerance;
        for robot in &mut self.robots {
            robot.retire_reached(tolerance);
            let nearest = self
                .obstacles
                .iter()
                .map(|o| o.distance(robot.pose.position))
                .fold(f64::INFINITY, f64::min);
            let colliding = nearest < self.config.collision_distance;
            robot.status = if colliding {
                RobotStatus::Collision
            } else {
                robot.mission
            };
        }

        let snapshots = self.robots.iter().map(|r| self.snapshot(r)).collect();
        let decisions = self.service.compute_decisions(snapshots).await?;

        let drive = self.service.drive();
        let dt = self.service.config().control.dt * self.config.time_scale;
        for (robot, decision) in self.robots.iter_mut().zip(&decisions) {
            robot.pose = drive
                .update_pose_from_wheel_speeds(robot.pose, decision.wheel_speeds, dt)
                .map_err(|e| anyhow::anyhow!("odometry update failed: {e}"))?;
            robot.previous = decision.behavior;
            robot.pid = decision.pid_state;
        }

        self.telemetry.publish(TickReport { tick, decisions });
        Ok(())
    }

    /// Tick until every robot is done or the tick budget runs out.
    pub async fn run(mut self) -> anyhow::Result<Vec<SimRobot>> {
        let period = self.config.tick_period().context("invalid simulation config")?;
        info!(
            robots = self.robots.len(),
            tick_ms = self.config.tick_ms,
            max_ticks = self.config.max_ticks,
            "Simulation started"
        );
        let mut ticker = time::interval(period);
        for tick in 0..self.config.max_ticks {
            ticker.tick().await;
            self.step(tick).await?;
            if self.robots.iter().all(SimRobot::is_done) {
                info!(tick, "All robots finished");
                break;
            }
        }
        for robot in &self.robots {
            info!(robot_id = robot.id, pose = %robot.pose, done = robot.is_done(), "Final state");
        }
        Ok(self.robots)
    }
}

/// Log every decision batch until the topic closes.
pub async fn telemetry_task(mut rx: broadcast::Receiver<Arc<TickReport>>) -> anyhow::Result<()> {
    info!("Telemetry task started.");
    loop {
        match rx.recv().await {
            Ok(report) => {
                for d in &report.decisions {
                    debug!(tick = report.tick, decision = %d, "Decision");
                }
                if report.tick % 100 == 0 {
                    let idle = report.decisions.iter().filter(|d| d.is_idle()).count();
                    info!(tick = report.tick, robots = report.decisions.len(), idle, "Fleet tick");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Telemetry receiver lagged by {} messages.", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Telemetry topic closed.");
                return Ok(());
            }
        }
    }
}
